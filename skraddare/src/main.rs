//! Build customized Commit Mono fonts.
//!
//! Every option can also be given through the environment variable named
//! after it, e.g. `FEATURES=ss01,ss03 LETTER_SPACING=2 skraddare`.

use std::{path::PathBuf, time::Instant};

use clap::Parser;
use skraddare::{
    parse_number, parse_tag_list, parse_weight, run_batch, Customization, Error, WeightRange,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Lightest weight to build.
    #[arg(long, env = "WEIGHT_MIN", default_value = "200")]
    weight_min: String,

    /// Heaviest weight to build (inclusive).
    #[arg(long, env = "WEIGHT_MAX", default_value = "700")]
    weight_max: String,

    /// Distance between built weights.
    #[arg(long, env = "WEIGHT_STEP", default_value = "25")]
    weight_step: String,

    /// Extra space between letters; each unit adds 10 font units.
    #[arg(long, env = "LETTER_SPACING", default_value = "0", allow_hyphen_values = true)]
    letter_spacing: String,

    /// Line height multiplier.
    #[arg(long, env = "LINE_HEIGHT", default_value = "1")]
    line_height: String,

    /// Comma separated stylistic sets to turn on by default (ss01..ss05).
    #[arg(long, env = "FEATURES", default_value = "")]
    features: String,

    /// Comma separated character variants to bake in (cv01..cv11).
    #[arg(long, env = "ALTERNATES", default_value = "")]
    alternates: String,

    /// Appended to the family name as `CommitMono-<suffix>`.
    #[arg(long, env = "SUFFIX", default_value = "")]
    suffix: String,

    /// Directory holding the source OTFs.
    #[arg(long, env = "SOURCE_DIR", default_value = "src/fonts/fontlab")]
    source_dir: PathBuf,

    /// Where fonts and the settings record are written.
    #[arg(long, env = "OUT_DIR", default_value = "fonts")]
    out_dir: PathBuf,
}

fn customization(args: &Args) -> Result<Customization, Error> {
    let weights = WeightRange::new(
        parse_weight("WEIGHT_MIN", &args.weight_min)?,
        parse_weight("WEIGHT_MAX", &args.weight_max)?,
        parse_weight("WEIGHT_STEP", &args.weight_step)?,
    )?;
    Customization::new(
        weights,
        parse_number("LETTER_SPACING", &args.letter_spacing)?,
        parse_number("LINE_HEIGHT", &args.line_height)?,
        &parse_tag_list(&args.features),
        &parse_tag_list(&args.alternates),
        &args.suffix,
    )
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let started = Instant::now();
    let report = customization(&args)
        .and_then(|custom| run_batch(&custom, &args.source_dir, &args.out_dir));
    match report {
        Ok(report) => println!(
            "Done: {} OTF files in {} ({:.1}s)",
            report.fonts.len(),
            args.out_dir.display(),
            started.elapsed().as_secs_f64()
        ),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
