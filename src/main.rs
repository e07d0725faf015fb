use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use avd_index::audit::{audit, AuditConfig};
use avd_index::report::{HtmlReporter, JsonReporter, Reporter};
use avd_index::scene::SceneStatus;
use avd_index::{AvdDataset, DatasetConfig, ImageData};

#[derive(Parser)]
#[command(name = "avd-index")]
#[command(version)]
#[command(about = "Indexable image/label access for the Active Vision Dataset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DatasetArgs {
    /// Root directory holding the scene folders
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,

    /// YAML dataset config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the default test scenes instead of the train scenes
    #[arg(long)]
    test: bool,

    /// Scene to include (repeatable); replaces the default scene list
    #[arg(short, long = "scene", value_name = "SCENE")]
    scenes: Vec<String>,
}

impl DatasetArgs {
    fn to_config(&self) -> Result<DatasetConfig> {
        let mut config = match (&self.config, &self.root) {
            (Some(path), _) => DatasetConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            (None, Some(root)) => DatasetConfig::new(root),
            (None, None) => anyhow::bail!("Either ROOT or --config is required"),
        };
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if self.test {
            config.train = false;
        }
        if !self.scenes.is_empty() {
            config.scene_list = Some(self.scenes.clone());
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show scene status and index size
    Info {
        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Load one item and print its target
    Get {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Position in the sorted image index
        #[arg(long)]
        index: usize,

        /// Crop each box and return instance ids
        #[arg(long)]
        classification: bool,
    },

    /// Check that every indexed image has an annotation record
    Audit {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Also decode every image
        #[arg(long)]
        decode: bool,

        /// Output file (json or html based on extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of images to sample (0 = all)
        #[arg(long, default_value = "0")]
        sample: usize,

        /// Random seed for sampling
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fail if missing annotations exceed threshold
        #[arg(long)]
        fail_on_missing: Option<usize>,

        /// Number of parallel workers
        #[arg(short = 'j', long)]
        workers: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { dataset } => run_info(dataset),
        Commands::Get {
            dataset,
            index,
            classification,
        } => run_get(dataset, index, classification),
        Commands::Audit {
            dataset,
            decode,
            output,
            sample,
            seed,
            fail_on_missing,
            workers,
        } => run_audit(dataset, decode, output, sample, seed, fail_on_missing, workers),
    }
}

fn run_info(args: DatasetArgs) -> Result<()> {
    let config = args.to_config()?;

    println!("Root: {}", config.root.display());
    println!();
    println!("Scenes:");
    let mut complete = true;
    for scene in config.effective_scenes() {
        let status = SceneStatus::probe(&config.root, &scene);
        if status.is_complete() {
            println!("  ✓ {}", scene);
        } else {
            complete = false;
            println!("  ✗ {} (missing: {})", scene, status.missing().join(", "));
        }
    }
    println!();

    if !complete {
        anyhow::bail!("Dataset incomplete, fix the scenes marked ✗");
    }

    let dataset = AvdDataset::open(config)?;
    println!("Images: {}", dataset.len());
    println!("Index fingerprint: {}", dataset.fingerprint());

    Ok(())
}

fn run_get(args: DatasetArgs, index: usize, classification: bool) -> Result<()> {
    let mut config = args.to_config()?;
    if classification {
        config.classification = true;
    }

    let dataset = AvdDataset::open(config)?;
    let image_name = dataset.image_name(index)?.to_string();
    let scene = dataset.scene_of(index)?;
    let sample = dataset
        .get(index)
        .with_context(|| format!("Failed to load item {} ({})", index, image_name))?;

    let kind = match sample.image {
        ImageData::Full(_) => "full",
        ImageData::Crops(_) => "crops",
    };
    let out = serde_json::json!({
        "index": index,
        "image": image_name,
        "scene": scene,
        "image_kind": kind,
        "shapes": sample.image.shapes(),
        "target": sample.target,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    Ok(())
}

fn run_audit(
    args: DatasetArgs,
    decode: bool,
    output: Option<PathBuf>,
    sample: usize,
    seed: u64,
    fail_on_missing: Option<usize>,
    workers: Option<usize>,
) -> Result<()> {
    let start = Instant::now();

    let config = args.to_config()?;
    println!("📂 Loading dataset: {}", config.root.display());
    let dataset = AvdDataset::open(config)?;
    println!("   Scenes: {}", dataset.scenes().len());
    println!("   Images: {}", dataset.len());

    if let Some(w) = workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(w)
            .build_global()
            .ok();
    }

    let to_audit = if sample > 0 && sample < dataset.len() {
        println!("   Sampled: {} images (seed={})", sample, seed);
        sample
    } else {
        dataset.len()
    };

    let pb = ProgressBar::new(to_audit as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    println!();
    println!("🔬 Auditing {} images...", to_audit);
    let audit_config = AuditConfig {
        decode_images: decode,
        sample,
        seed,
    };
    let result = audit(&dataset, &audit_config, Some(&pb))?;
    pb.finish_with_message("Done!");

    println!();
    println!("  Images audited:     {}", result.images_audited);
    println!("  Images with issues: {}", result.images_with_issues());
    println!("  Boxes:              {}", result.total_boxes());
    println!();
    println!("  By scene:");
    for s in &result.scenes {
        println!(
            "    {}: {} images, {} annotated, {} missing, {} malformed, {} unreadable",
            s.scene,
            s.images,
            s.annotated,
            s.missing_annotations,
            s.malformed_names,
            s.unreadable_images
        );
    }
    println!();
    println!("  By type:");
    for (issue_type, count) in &result.by_type {
        println!("    {}: {}", issue_type, count);
    }
    println!();
    println!("  Time: {:.2}s", start.elapsed().as_secs_f64());

    if let Some(output_path) = &output {
        let ext = output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");

        match ext {
            "html" => {
                HtmlReporter::new().generate(&result, output_path)?;
                println!("📄 HTML report saved: {}", output_path.display());
            }
            _ => {
                JsonReporter::new().generate(&result, output_path)?;
                println!("📄 JSON report saved: {}", output_path.display());
            }
        }
    }

    if let Some(threshold) = fail_on_missing {
        let missing = result.count_of(&avd_index::models::IssueType::MissingAnnotation);
        if missing > threshold {
            eprintln!(
                "❌ FAIL: Missing annotations ({}) exceed threshold ({})",
                missing, threshold
            );
            std::process::exit(1);
        }
        println!("✅ PASS: Missing annotations within threshold");
    }

    Ok(())
}
