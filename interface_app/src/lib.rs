//! Phone interface shell: adapts the Android activity lifecycle to the
//! interface runtime. Gates launch on permissions, unpacks bundled assets
//! into the cache, then forwards lifecycle callbacks across the FFI
//! boundary until the OS tears the activity down.

#[cfg(target_os = "android")]
mod shell {
	use android_activity::{AndroidApp, MainEvent, PollEvent};
	use color_eyre::eyre::{eyre, Result};
	use log::{error, info, warn};
	use starbridge::android::{cache_dir, ActivityPermissionHost, BundleAssetSource};
	use starbridge::assets::{self, MANIFEST_NAME};
	use starbridge::lifecycle::{AppRuntime, LifecycleEvent, LifecycleForwarder, Phase};
	use starbridge::permissions::{run_gate, GateOutcome};
	use std::time::Duration;

	// Native entry points of the interface runtime. No return channel:
	// failures on the far side are invisible here.
	extern "C" {
		fn interface_on_create();
		fn interface_enter_foreground();
		fn interface_enter_background();
		fn interface_on_destroy();
	}

	struct InterfaceRuntime;

	impl AppRuntime for InterfaceRuntime {
		fn on_create(&mut self) {
			unsafe { interface_on_create() }
		}
		fn on_resume(&mut self) {
			unsafe { interface_enter_foreground() }
		}
		fn on_pause(&mut self) {
			unsafe { interface_enter_background() }
		}
		fn on_destroy(&mut self) {
			unsafe { interface_on_destroy() }
		}
	}

	pub fn main(app: AndroidApp) {
		android_logger::init_once(
			android_logger::Config::default()
				.with_max_level(log::LevelFilter::Info)
				.with_tag("interface_app"),
		);
		if let Err(e) = run(app) {
			error!("interface shell failed during startup: {e:?}");
		}
	}

	fn run(app: AndroidApp) -> Result<()> {
		match run_gate(&mut ActivityPermissionHost::new(&app)) {
			GateOutcome::AlreadyGranted => {}
			GateOutcome::Granted => info!("all permissions granted"),
			// Denial has never blocked launch here, it only gets logged.
			GateOutcome::Denied(denied) => warn!("launching without {denied:?}"),
		}

		let cache_root = cache_dir(&app).map_err(|e| eyre!("no cache directory: {e}"))?;
		let bundle = BundleAssetSource::new(&app);
		// Fatal on failure: the runtime must not start against a partial cache.
		assets::unpack(&bundle, MANIFEST_NAME, &cache_root)?;

		let mut forwarder = LifecycleForwarder::new(InterfaceRuntime);
		forwarder.handle(LifecycleEvent::Create);

		while forwarder.phase() != Phase::Destroyed {
			app.poll_events(Some(Duration::from_millis(100)), |event| {
				if let PollEvent::Main(event) = event {
					match event {
						MainEvent::Resume { .. } => forwarder.handle(LifecycleEvent::Resume),
						MainEvent::Pause => forwarder.handle(LifecycleEvent::Pause),
						MainEvent::Destroy => forwarder.handle(LifecycleEvent::Destroy),
						_ => {}
					}
				}
			});
		}
		Ok(())
	}
}

#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(app: android_activity::AndroidApp) {
	shell::main(app);
}
