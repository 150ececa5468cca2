#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process;

use prognos::convert::{EffectSizeKind, convert_effect_size};
use prognos::discrimination::{pr_auc_parametric, roc_auc_parametric};
use prognos::parametric::{
    ParametricBinaryConfig, ParametricContinuousConfig, View, parametric_binary,
    parametric_continuous,
};
use prognos::threshold::{OptimizeMetric, find_optimal_threshold};
use prognos::types::ParametricResults;

#[derive(Clone, Copy, ValueEnum)]
enum ViewCli {
    True,
    Observed,
}

impl From<ViewCli> for View {
    fn from(view: ViewCli) -> View {
        match view {
            ViewCli::True => View::True,
            ViewCli::Observed => View::Observed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricCli {
    Youden,
    F1,
}

impl From<MetricCli> for OptimizeMetric {
    fn from(metric: MetricCli) -> OptimizeMetric {
        match metric {
            MetricCli::Youden => OptimizeMetric::Youden,
            MetricCli::F1 => OptimizeMetric::F1,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EffectKindCli {
    D,
    Auc,
    Or,
    LogOr,
    U3,
    R,
}

impl From<EffectKindCli> for EffectSizeKind {
    fn from(kind: EffectKindCli) -> EffectSizeKind {
        match kind {
            EffectKindCli::D => EffectSizeKind::D,
            EffectKindCli::Auc => EffectSizeKind::Auc,
            EffectKindCli::Or => EffectSizeKind::OddsRatio,
            EffectKindCli::LogOr => EffectSizeKind::LogOddsRatio,
            EffectKindCli::U3 => EffectSizeKind::U3,
            EffectKindCli::R => EffectSizeKind::R,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Args)]
struct ParametricArgs {
    /// Cohen's d effect size (standardized mean difference)
    #[arg(long, short = 'd')]
    cohens_d: f64,

    /// Prevalence of the positive class (0-1, exclusive)
    #[arg(long, short = 'b')]
    base_rate: f64,

    /// Decision threshold probability (0-1, exclusive)
    #[arg(long, short = 't', default_value = "0.5")]
    threshold: f64,

    /// Measurement reliability (ICC) of the predictor among controls
    #[arg(long, default_value = "1.0")]
    icc1: f64,

    /// Measurement reliability (ICC) of the predictor among cases
    #[arg(long, default_value = "1.0")]
    icc2: f64,

    /// Diagnostic/label reliability
    #[arg(long, short = 'k', default_value = "1.0")]
    kappa: f64,

    /// Report latent ("true") or attenuated ("observed") metrics
    #[arg(long, short = 'v', value_enum, default_value_t = ViewCli::Observed)]
    view: ViewCli,

    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Summary)]
    output: OutputFormat,
}

#[derive(Args)]
struct ParametricContinuousArgs {
    /// Pearson correlation between predictor and outcome
    #[arg(long, short = 'r')]
    pearson_r: f64,

    /// Prevalence of the positive class (0-1, exclusive)
    #[arg(long, short = 'b')]
    base_rate: f64,

    /// Decision threshold probability (0-1, exclusive)
    #[arg(long, short = 't', default_value = "0.5")]
    threshold: f64,

    /// Measurement reliability of the predictor X
    #[arg(long = "rel-x", default_value = "1.0")]
    reliability_x: f64,

    /// Measurement reliability of the outcome Y
    #[arg(long = "rel-y", default_value = "1.0")]
    reliability_y: f64,

    /// Report latent ("true") or attenuated ("observed") metrics
    #[arg(long, short = 'v', value_enum, default_value_t = ViewCli::Observed)]
    view: ViewCli,

    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Summary)]
    output: OutputFormat,
}

#[derive(Parser)]
#[command(
    name = "prognos",
    about = "Translate effect sizes into expected real-world classification performance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Metric battery from Cohen's d under Gaussian assumptions
    Parametric(ParametricArgs),

    /// Metric battery from Pearson's r for a dichotomized outcome
    ParametricContinuous(ParametricContinuousArgs),

    /// Convert between effect-size representations via Cohen's d
    Convert {
        /// The effect size value to convert
        #[arg(long)]
        value: f64,

        #[arg(long, value_enum)]
        from: EffectKindCli,

        #[arg(long, value_enum, default_value_t = EffectKindCli::D)]
        to: EffectKindCli,

        /// Only consulted for the point-biserial target
        #[arg(long, default_value = "0.5")]
        base_rate: f64,
    },

    /// Closed-form ROC-AUC for a Cohen's d
    RocAuc {
        #[arg(long, short = 'd')]
        cohens_d: f64,

        #[arg(long, default_value = "1.0")]
        sigma1: f64,

        #[arg(long, default_value = "1.0")]
        sigma2: f64,
    },

    /// Numerically integrated PR-AUC for a Cohen's d and prevalence
    PrAuc {
        #[arg(long, short = 'd')]
        cohens_d: f64,

        #[arg(long, short = 'b')]
        base_rate: f64,

        #[arg(long, default_value = "1.0")]
        sigma1: f64,

        #[arg(long, default_value = "1.0")]
        sigma2: f64,
    },

    /// Measurement threshold maximizing Youden's J or F1
    OptimalThreshold {
        #[arg(long, short = 'd')]
        cohens_d: f64,

        #[arg(long, short = 'b')]
        base_rate: f64,

        #[arg(long, value_enum, default_value_t = MetricCli::Youden)]
        metric: MetricCli,

        #[arg(long, default_value = "1.0")]
        sigma1: f64,

        #[arg(long, default_value = "1.0")]
        sigma2: f64,
    },
}

fn print_value(name: &str, value: f64) {
    println!("{name}: {value:.4}");
}

fn print_results(
    results: &ParametricResults,
    output: OutputFormat,
    headline: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        OutputFormat::Summary => {
            let m = &results.threshold_metrics;
            println!("{}", "=".repeat(50));
            println!("{headline}");
            println!("{}", "=".repeat(50));
            println!();
            println!("Base rate: {:.2}%", 100.0 * results.base_rate);
            println!("Threshold probability: {:.2}%", 100.0 * results.threshold_prob);
            println!("\n--- Effect Sizes ---");
            print_value("Cohen's d (observed)", results.cohens_d_observed);
            print_value("Odds Ratio", results.odds_ratio);
            print_value("Cohen's U3", results.cohens_u3);
            print_value("Point-biserial r", results.point_biserial_r);
            println!("\n--- Discrimination ---");
            print_value("ROC-AUC", results.roc_auc);
            print_value("PR-AUC", results.pr_auc);
            println!("\n--- Classification (at threshold {:.4}) ---", results.threshold_value);
            print_value("Sensitivity", m.sensitivity);
            print_value("Specificity", m.specificity);
            print_value("PPV", m.ppv);
            print_value("NPV", m.npv);
            print_value("F1", m.f1);
            print_value("MCC", m.mcc);
            println!("\n--- Clinical Utility ---");
            print_value("LR+", m.lr_plus);
            print_value("LR-", m.lr_minus);
            println!("Delta NB: {:.6}", m.delta_nb);
        }
    }
    Ok(())
}

fn run_parametric(args: ParametricArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ParametricBinaryConfig {
        cohens_d: args.cohens_d,
        base_rate: args.base_rate,
        threshold_prob: args.threshold,
        icc1: args.icc1,
        icc2: args.icc2,
        kappa: args.kappa,
        view: args.view.into(),
    };
    let results = parametric_binary(&config)?;
    print_results(
        &results,
        args.output,
        &format!("Parametric analysis (Cohen's d = {})", args.cohens_d),
    )
}

fn run_parametric_continuous(
    args: ParametricContinuousArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ParametricContinuousConfig {
        pearson_r: args.pearson_r,
        base_rate: args.base_rate,
        threshold_prob: args.threshold,
        reliability_x: args.reliability_x,
        reliability_y: args.reliability_y,
        view: args.view.into(),
    };
    let results = parametric_continuous(&config)?;
    print_results(
        &results,
        args.output,
        &format!("Parametric analysis (Pearson's r = {})", args.pearson_r),
    )
}

fn run_convert(
    value: f64,
    from: EffectKindCli,
    to: EffectKindCli,
    base_rate: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = convert_effect_size(value, from.into(), to.into(), base_rate)?;
    println!("{}", serde_json::to_string_pretty(&conversion)?);
    Ok(())
}

fn run_optimal_threshold(
    cohens_d: f64,
    base_rate: f64,
    metric: MetricCli,
    sigma1: f64,
    sigma2: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let threshold = find_optimal_threshold(cohens_d, base_rate, sigma1, sigma2, metric.into())?;
    print_value("Optimal threshold", threshold);
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parametric(args) => run_parametric(args),
        Commands::ParametricContinuous(args) => run_parametric_continuous(args),
        Commands::Convert { value, from, to, base_rate } => run_convert(value, from, to, base_rate),
        Commands::RocAuc { cohens_d, sigma1, sigma2 } => {
            print_value("ROC-AUC", roc_auc_parametric(cohens_d, sigma1, sigma2));
            Ok(())
        }
        Commands::PrAuc { cohens_d, base_rate, sigma1, sigma2 } => {
            print_value("PR-AUC", pr_auc_parametric(cohens_d, base_rate, sigma1, sigma2));
            Ok(())
        }
        Commands::OptimalThreshold { cohens_d, base_rate, metric, sigma1, sigma2 } => {
            run_optimal_threshold(cohens_d, base_rate, metric, sigma1, sigma2)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
