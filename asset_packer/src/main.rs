//! Host-side companion to the app shells: writes the cache manifest the
//! shells unpack on device, and can run that unpack against a host
//! directory so build tooling can verify a bundle before it ships.

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use log::info;
use serde::Serialize;
use starbridge::assets::{self, AssetManifest, DirAssetSource, UnpackOutcome, MANIFEST_NAME};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
	#[clap(subcommand)]
	command: Command,
	/// Print a JSON summary instead of plain text
	#[clap(long, global = true)]
	json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Write a cache manifest for a directory of bundled assets
	Generate {
		/// Directory that will ship as the app's asset bundle
		assets_dir: PathBuf,
		/// Manifest path, defaults to <assets_dir>/cache_assets.txt
		#[clap(short, long)]
		output: Option<PathBuf>,
		/// Stamp line, defaults to today's UTC date
		#[clap(long)]
		stamp: Option<String>,
	},
	/// Unpack a bundle directory into a cache root, as the shells do on device
	Unpack {
		assets_dir: PathBuf,
		dest_root: PathBuf,
	},
}

#[derive(Debug, Serialize)]
struct Summary {
	stamp: String,
	files: usize,
	skipped: bool,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let summary = match args.command {
		Command::Generate {
			assets_dir,
			output,
			stamp,
		} => {
			let stamp = stamp.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
			let output = output.unwrap_or_else(|| assets_dir.join(MANIFEST_NAME));
			let manifest = generate_manifest(&assets_dir, &output, stamp)?;
			Summary {
				stamp: manifest.stamp,
				files: manifest.paths.len(),
				skipped: false,
			}
		}
		Command::Unpack {
			assets_dir,
			dest_root,
		} => {
			let source = DirAssetSource::new(&assets_dir);
			match assets::unpack(&source, MANIFEST_NAME, &dest_root)? {
				UnpackOutcome::AlreadyUnpacked { stamp } => Summary {
					stamp,
					files: 0,
					skipped: true,
				},
				UnpackOutcome::Unpacked { stamp, copied } => Summary {
					stamp,
					files: copied,
					skipped: false,
				},
			}
		}
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&summary)?);
	} else if summary.skipped {
		println!("cache already stamped {}, nothing copied", summary.stamp);
	} else {
		println!("{} files, stamp {}", summary.files, summary.stamp);
	}
	Ok(())
}

/// List every file under `assets_dir` except the manifest itself and write
/// the manifest: stamp line first, then sorted bundle-relative paths.
fn generate_manifest(assets_dir: &Path, output: &Path, stamp: String) -> Result<AssetManifest> {
	let mut paths = Vec::new();
	for entry in WalkDir::new(assets_dir) {
		let entry = entry?;
		if !entry.file_type().is_file() || entry.path() == output {
			continue;
		}
		let relative = entry.path().strip_prefix(assets_dir)?;
		let relative = relative
			.to_str()
			.ok_or_else(|| eyre!("asset path {relative:?} is not valid UTF-8"))?;
		paths.push(relative.replace('\\', "/"));
	}
	paths.sort();

	let manifest = AssetManifest { stamp, paths };
	let mut text = manifest.stamp.clone();
	for path in &manifest.paths {
		text.push('\n');
		text.push_str(path);
	}
	text.push('\n');
	fs::write(output, text)?;
	info!("wrote manifest for {} assets to {output:?}", manifest.paths.len());
	Ok(manifest)
}

#[test]
fn test_generate_manifest_lists_bundle_files() {
	let dir = tempdir::TempDir::new("bundle").unwrap();
	fs::create_dir_all(dir.path().join("scripts")).unwrap();
	fs::write(dir.path().join("scripts/defaults.js"), "js").unwrap();
	fs::write(dir.path().join("icon.png"), "png").unwrap();

	let output = dir.path().join(MANIFEST_NAME);
	let manifest = generate_manifest(dir.path(), &output, "2024-06-01".to_string()).unwrap();
	assert_eq!(manifest.paths, vec!["icon.png", "scripts/defaults.js"]);
	assert_eq!(
		fs::read_to_string(&output).unwrap(),
		"2024-06-01\nicon.png\nscripts/defaults.js\n"
	);

	// Regenerating must not pick up the manifest it just wrote.
	let again = generate_manifest(dir.path(), &output, "2024-06-02".to_string()).unwrap();
	assert_eq!(again.paths, manifest.paths);
}

#[test]
fn test_generated_manifest_unpacks_on_the_device_path() {
	let dir = tempdir::TempDir::new("bundle").unwrap();
	fs::write(dir.path().join("a.txt"), "alpha").unwrap();
	let output = dir.path().join(MANIFEST_NAME);
	generate_manifest(dir.path(), &output, "v7".to_string()).unwrap();

	let cache = tempdir::TempDir::new("cache").unwrap();
	let source = DirAssetSource::new(dir.path());
	let outcome = assets::unpack(&source, MANIFEST_NAME, cache.path()).unwrap();
	assert_eq!(
		outcome,
		UnpackOutcome::Unpacked {
			stamp: "v7".to_string(),
			copied: 1
		}
	);
	assert_eq!(fs::read_to_string(cache.path().join("a.txt")).unwrap(), "alpha");
	assert!(cache.path().join("v7").exists());
}
