//! Bindings from the platform-independent glue to the Android OS: the bundle
//! asset source, the JNI-backed permission host, and cache directory lookup.

use crate::assets::AssetSource;
use crate::permissions::{Permission, PermissionHost};
use android_activity::AndroidApp;
use jni::objects::{JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use log::warn;
use std::ffi::CString;
use std::io::{self, Read};
use std::path::PathBuf;

/// Request code the platform echoes back to the activity's permission
/// callback.
pub const PERMISSION_REQUEST_CODE: i32 = 20;

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: i32 = 0;

fn with_activity<T>(
	app: &AndroidApp,
	f: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
) -> jni::errors::Result<T> {
	let vm = unsafe { JavaVM::from_raw(app.vm_as_ptr() as *mut jni::sys::JavaVM) }?;
	let mut env = vm.attach_current_thread()?;
	let activity = unsafe { JObject::from_raw(app.activity_as_ptr() as jni::sys::jobject) };
	f(&mut env, &activity)
}

/// Absolute path of the app's cache directory (`Context.getCacheDir()`).
pub fn cache_dir(app: &AndroidApp) -> jni::errors::Result<PathBuf> {
	with_activity(app, |env, activity| {
		let dir = env
			.call_method(activity, "getCacheDir", "()Ljava/io/File;", &[])?
			.l()?;
		let path = env
			.call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
			.l()?;
		let path: String = env.get_string(&JString::from(path))?.into();
		Ok(PathBuf::from(path))
	})
}

/// [`AssetSource`] over the app bundle's `AAssetManager`.
pub struct BundleAssetSource {
	assets: ndk::asset::AssetManager,
}

impl BundleAssetSource {
	pub fn new(app: &AndroidApp) -> Self {
		BundleAssetSource {
			assets: app.asset_manager(),
		}
	}
}

impl AssetSource for BundleAssetSource {
	fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
		let name = CString::new(path)
			.map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "NUL in asset path"))?;
		let asset = self.assets.open(&name).ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, format!("no bundled asset {path:?}"))
		})?;
		Ok(Box::new(asset))
	}
}

/// [`PermissionHost`] over JNI calls on the activity object.
pub struct ActivityPermissionHost<'a> {
	app: &'a AndroidApp,
}

impl<'a> ActivityPermissionHost<'a> {
	pub fn new(app: &'a AndroidApp) -> Self {
		ActivityPermissionHost { app }
	}
}

impl PermissionHost for ActivityPermissionHost<'_> {
	fn is_granted(&self, permission: Permission) -> bool {
		let check = with_activity(self.app, |env, activity| {
			let name: JObject = env.new_string(permission.android_name())?.into();
			env.call_method(
				activity,
				"checkSelfPermission",
				"(Ljava/lang/String;)I",
				&[JValue::Object(&name)],
			)?
			.i()
		});
		match check {
			Ok(code) => code == PERMISSION_GRANTED,
			Err(e) => {
				warn!("checkSelfPermission({}) failed: {e}", permission.android_name());
				false
			}
		}
	}

	fn request(&mut self, permissions: &[Permission]) -> Vec<(Permission, bool)> {
		let requested = with_activity(self.app, |env, activity| {
			let batch =
				env.new_object_array(permissions.len() as i32, "java/lang/String", JObject::null())?;
			for (i, permission) in permissions.iter().enumerate() {
				let name: JObject = env.new_string(permission.android_name())?.into();
				env.set_object_array_element(&batch, i as i32, name)?;
			}
			let batch: JObject = batch.into();
			env.call_method(
				activity,
				"requestPermissions",
				"([Ljava/lang/String;I)V",
				&[JValue::Object(&batch), JValue::Int(PERMISSION_REQUEST_CODE)],
			)?;
			Ok(())
		});
		if let Err(e) = requested {
			warn!("requestPermissions failed: {e}");
		}
		// The grant dialog reports back to the activity, not to us. Grants
		// are re-sampled immediately; a dialog still pending reads as denied,
		// which only affects what the caller logs.
		permissions
			.iter()
			.map(|&permission| (permission, self.is_granted(permission)))
			.collect()
	}
}
