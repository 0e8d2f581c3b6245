use log::{debug, info};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Manifest resource bundled with every app image.
pub const MANIFEST_NAME: &str = "cache_assets.txt";

#[derive(Debug, Error)]
pub enum UnpackError {
	#[error("asset manifest has no stamp line")]
	MissingStamp,
	#[error("asset path {0:?} would escape the cache root")]
	UnsafePath(String),
	#[error("could not open bundled asset {path:?}")]
	OpenAsset {
		path: String,
		#[source]
		source: io::Error,
	},
	#[error(transparent)]
	Io(#[from] io::Error),
}

/// Read-only accessor for files packaged with the application.
pub trait AssetSource {
	fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Asset source over a plain directory, for host-side tools and tests.
pub struct DirAssetSource {
	root: PathBuf,
}

impl DirAssetSource {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		DirAssetSource { root: root.into() }
	}
}

impl AssetSource for DirAssetSource {
	fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
		Ok(Box::new(File::open(self.root.join(path))?))
	}
}

/// Parsed cache manifest: a stamp line followed by the relative paths to
/// copy out of the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetManifest {
	pub stamp: String,
	pub paths: Vec<String>,
}

impl AssetManifest {
	/// One token per line: the first non-empty line is the stamp, every
	/// following non-empty line is a relative path. Lines are trimmed.
	pub fn parse(reader: impl BufRead) -> Result<Self, UnpackError> {
		let mut stamp = None;
		let mut paths = Vec::new();
		for line in reader.lines() {
			let line = line?;
			let line = line.trim();
			if line.is_empty() {
				continue;
			}
			ensure_relative(line)?;
			if stamp.is_none() {
				stamp = Some(line.to_string());
			} else {
				paths.push(line.to_string());
			}
		}
		Ok(AssetManifest {
			stamp: stamp.ok_or(UnpackError::MissingStamp)?,
			paths,
		})
	}

	/// Zero-content sentinel whose existence records a completed unpack.
	pub fn marker_path(&self, dest_root: &Path) -> PathBuf {
		dest_root.join(&self.stamp)
	}
}

fn ensure_relative(path: &str) -> Result<(), UnpackError> {
	let safe = Path::new(path)
		.components()
		.all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
	if safe {
		Ok(())
	} else {
		Err(UnpackError::UnsafePath(path.to_string()))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnpackOutcome {
	/// The marker was already present, nothing was copied.
	AlreadyUnpacked { stamp: String },
	Unpacked { stamp: String, copied: usize },
}

/// Read the named manifest out of the bundle and unpack everything it lists
/// into `dest_root`.
pub fn unpack(
	source: &dyn AssetSource,
	manifest_name: &str,
	dest_root: &Path,
) -> Result<UnpackOutcome, UnpackError> {
	let manifest_file = source
		.open(manifest_name)
		.map_err(|source| UnpackError::OpenAsset {
			path: manifest_name.to_string(),
			source,
		})?;
	let manifest = AssetManifest::parse(BufReader::new(manifest_file))?;
	unpack_manifest(source, &manifest, dest_root)
}

/// Copy every manifest-listed file out of the bundle into `dest_root`,
/// overwriting whatever is already there. Runs synchronously on the calling
/// thread.
///
/// The marker file is written last: if any copy fails the marker never
/// appears and the next run re-copies the full list.
pub fn unpack_manifest(
	source: &dyn AssetSource,
	manifest: &AssetManifest,
	dest_root: &Path,
) -> Result<UnpackOutcome, UnpackError> {
	let marker = manifest.marker_path(dest_root);
	if marker.exists() {
		debug!("asset cache is current, marker {marker:?} present");
		return Ok(UnpackOutcome::AlreadyUnpacked {
			stamp: manifest.stamp.clone(),
		});
	}

	fs::create_dir_all(dest_root)?;
	for path in &manifest.paths {
		let dest = dest_root.join(path);
		if dest.exists() {
			fs::remove_file(&dest)?;
		}
		if let Some(parent) = dest.parent() {
			fs::create_dir_all(parent)?;
		}
		let mut src = source.open(path).map_err(|source| UnpackError::OpenAsset {
			path: path.clone(),
			source,
		})?;
		io::copy(&mut src, &mut File::create(&dest)?)?;
	}
	File::create(&marker)?;
	info!(
		"unpacked {} assets into {dest_root:?} (stamp {})",
		manifest.paths.len(),
		manifest.stamp
	);
	Ok(UnpackOutcome::Unpacked {
		stamp: manifest.stamp.clone(),
		copied: manifest.paths.len(),
	})
}

#[cfg(test)]
fn test_bundle(manifest: &str, files: &[(&str, &str)]) -> (tempdir::TempDir, DirAssetSource) {
	let dir = tempdir::TempDir::new("bundle").unwrap();
	fs::write(dir.path().join(MANIFEST_NAME), manifest).unwrap();
	for (path, contents) in files {
		let full = dir.path().join(path);
		fs::create_dir_all(full.parent().unwrap()).unwrap();
		fs::write(full, contents).unwrap();
	}
	let source = DirAssetSource::new(dir.path());
	(dir, source)
}

#[test]
fn test_parse_manifest() {
	let text = "2019-02-15\n\nscripts/defaultScripts.js\nfonts/glyphs.ttf\n";
	let manifest = AssetManifest::parse(text.as_bytes()).unwrap();
	assert_eq!(manifest.stamp, "2019-02-15");
	assert_eq!(
		manifest.paths,
		vec!["scripts/defaultScripts.js", "fonts/glyphs.ttf"]
	);
}

#[test]
fn test_parse_manifest_requires_stamp() {
	assert!(matches!(
		AssetManifest::parse("".as_bytes()),
		Err(UnpackError::MissingStamp)
	));
	assert!(matches!(
		AssetManifest::parse("\n  \n".as_bytes()),
		Err(UnpackError::MissingStamp)
	));
}

#[test]
fn test_parse_manifest_rejects_escaping_paths() {
	assert!(matches!(
		AssetManifest::parse("stamp\n../../etc/passwd\n".as_bytes()),
		Err(UnpackError::UnsafePath(_))
	));
	assert!(matches!(
		AssetManifest::parse("stamp\n/etc/passwd\n".as_bytes()),
		Err(UnpackError::UnsafePath(_))
	));
}

#[test]
fn test_unpack_copies_every_listed_file() {
	let (_bundle, source) = test_bundle(
		"v1\na.txt\nnested/deep/b.txt\n",
		&[("a.txt", "alpha"), ("nested/deep/b.txt", "beta")],
	);
	let dest = tempdir::TempDir::new("cache").unwrap();

	let outcome = unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	assert_eq!(
		outcome,
		UnpackOutcome::Unpacked {
			stamp: "v1".to_string(),
			copied: 2
		}
	);
	assert_eq!(fs::read_to_string(dest.path().join("a.txt")).unwrap(), "alpha");
	assert_eq!(
		fs::read_to_string(dest.path().join("nested/deep/b.txt")).unwrap(),
		"beta"
	);
	assert!(dest.path().join("v1").exists());
}

#[test]
fn test_unpack_is_idempotent() {
	let (_bundle, source) = test_bundle("v1\na.txt\n", &[("a.txt", "alpha")]);
	let dest = tempdir::TempDir::new("cache").unwrap();

	unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	// Scribble over the copy; a second run must not touch it.
	fs::write(dest.path().join("a.txt"), "scribbled").unwrap();

	let outcome = unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	assert_eq!(
		outcome,
		UnpackOutcome::AlreadyUnpacked {
			stamp: "v1".to_string()
		}
	);
	assert_eq!(
		fs::read_to_string(dest.path().join("a.txt")).unwrap(),
		"scribbled"
	);
}

#[test]
fn test_unpack_retries_in_full_when_marker_is_missing() {
	let (_bundle, source) = test_bundle("v1\na.txt\nb.txt\n", &[("a.txt", "alpha"), ("b.txt", "beta")]);
	let dest = tempdir::TempDir::new("cache").unwrap();

	unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	fs::write(dest.path().join("a.txt"), "scribbled").unwrap();
	fs::remove_file(dest.path().join("v1")).unwrap();

	let outcome = unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	assert_eq!(
		outcome,
		UnpackOutcome::Unpacked {
			stamp: "v1".to_string(),
			copied: 2
		}
	);
	assert_eq!(fs::read_to_string(dest.path().join("a.txt")).unwrap(), "alpha");
}

#[test]
fn test_unpack_overwrites_preexisting_destination_files() {
	let (_bundle, source) = test_bundle("v1\na.txt\n", &[("a.txt", "alpha")]);
	let dest = tempdir::TempDir::new("cache").unwrap();
	fs::create_dir_all(dest.path()).unwrap();
	fs::write(dest.path().join("a.txt"), "stale contents from last install").unwrap();

	unpack(&source, MANIFEST_NAME, dest.path()).unwrap();
	assert_eq!(fs::read_to_string(dest.path().join("a.txt")).unwrap(), "alpha");
}

#[test]
fn test_unpack_missing_asset_is_fatal_and_leaves_no_marker() {
	let (_bundle, source) = test_bundle("v1\na.txt\nmissing.txt\n", &[("a.txt", "alpha")]);
	let dest = tempdir::TempDir::new("cache").unwrap();

	let err = unpack(&source, MANIFEST_NAME, dest.path()).unwrap_err();
	assert!(matches!(err, UnpackError::OpenAsset { .. }));
	// No marker, so the next launch retries the whole unpack.
	assert!(!dest.path().join("v1").exists());
}
