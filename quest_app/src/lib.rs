//! Quest headset shell. Runs the same startup gate and asset unpack as the
//! phone shell, then drives two native collaborators: the quest runtime
//! (plain lifecycle) and the VR display plugin, which additionally needs
//! every surface event together with the raw window handle.

#[cfg(target_os = "android")]
mod shell {
	use android_activity::{AndroidApp, MainEvent, PollEvent};
	use color_eyre::eyre::{eyre, Result};
	use log::{error, info, warn};
	use ndk::native_window::NativeWindow;
	use starbridge::android::{cache_dir, ActivityPermissionHost, BundleAssetSource};
	use starbridge::assets::{self, MANIFEST_NAME};
	use starbridge::lifecycle::{AppRuntime, LifecycleEvent, LifecycleForwarder, Phase};
	use starbridge::permissions::{run_gate, GateOutcome};
	use starbridge::surface::{DisplayPlugin, SurfaceRouter};
	use std::os::raw::c_void;
	use std::time::Duration;

	extern "C" {
		fn quest_runtime_on_create();
		fn quest_runtime_on_resume();
		fn quest_runtime_on_pause();
		fn quest_runtime_on_destroy();

		fn quest_display_on_create() -> u64;
		fn quest_display_on_resume(handle: u64);
		fn quest_display_on_pause(handle: u64);
		fn quest_display_on_destroy(handle: u64);
		fn quest_display_on_surface_created(handle: u64, window: *mut c_void);
		fn quest_display_on_surface_changed(handle: u64, window: *mut c_void);
		fn quest_display_on_surface_destroyed(handle: u64);
	}

	struct QuestRuntime;

	impl AppRuntime for QuestRuntime {
		fn on_create(&mut self) {
			unsafe { quest_runtime_on_create() }
		}
		fn on_resume(&mut self) {
			unsafe { quest_runtime_on_resume() }
		}
		fn on_pause(&mut self) {
			unsafe { quest_runtime_on_pause() }
		}
		fn on_destroy(&mut self) {
			unsafe { quest_runtime_on_destroy() }
		}
	}

	/// Handle-scoped display plugin. The handle comes from the native create
	/// entry and is released on drop, after the router has delivered any
	/// final surface teardown.
	struct QuestDisplayPlugin {
		handle: u64,
	}

	impl QuestDisplayPlugin {
		fn create() -> Self {
			QuestDisplayPlugin {
				handle: unsafe { quest_display_on_create() },
			}
		}
	}

	impl DisplayPlugin for QuestDisplayPlugin {
		type Surface = NativeWindow;

		fn resumed(&mut self) {
			unsafe { quest_display_on_resume(self.handle) }
		}
		fn paused(&mut self) {
			unsafe { quest_display_on_pause(self.handle) }
		}
		fn surface_created(&mut self, surface: NativeWindow) {
			unsafe { quest_display_on_surface_created(self.handle, surface.ptr().as_ptr().cast()) }
		}
		fn surface_changed(&mut self, surface: NativeWindow) {
			unsafe { quest_display_on_surface_changed(self.handle, surface.ptr().as_ptr().cast()) }
		}
		fn surface_destroyed(&mut self) {
			unsafe { quest_display_on_surface_destroyed(self.handle) }
		}
	}

	impl Drop for QuestDisplayPlugin {
		fn drop(&mut self) {
			unsafe { quest_display_on_destroy(self.handle) }
		}
	}

	pub fn main(app: AndroidApp) {
		android_logger::init_once(
			android_logger::Config::default()
				.with_max_level(log::LevelFilter::Info)
				.with_tag("quest_app"),
		);
		if let Err(e) = run(app) {
			error!("quest shell failed during startup: {e:?}");
		}
	}

	fn run(app: AndroidApp) -> Result<()> {
		match run_gate(&mut ActivityPermissionHost::new(&app)) {
			GateOutcome::AlreadyGranted => {}
			GateOutcome::Granted => info!("all permissions granted"),
			GateOutcome::Denied(denied) => warn!("launching without {denied:?}"),
		}

		let cache_root = cache_dir(&app).map_err(|e| eyre!("no cache directory: {e}"))?;
		let bundle = BundleAssetSource::new(&app);
		assets::unpack(&bundle, MANIFEST_NAME, &cache_root)?;

		let mut forwarder = LifecycleForwarder::new(QuestRuntime);
		forwarder.handle(LifecycleEvent::Create);
		let mut router = SurfaceRouter::new(QuestDisplayPlugin::create());

		while forwarder.phase() != Phase::Destroyed {
			app.poll_events(Some(Duration::from_millis(100)), |event| {
				if let PollEvent::Main(event) = event {
					match event {
						MainEvent::Resume { .. } => {
							forwarder.handle(LifecycleEvent::Resume);
							router.resumed();
						}
						MainEvent::Pause => {
							router.paused();
							forwarder.handle(LifecycleEvent::Pause);
						}
						MainEvent::InitWindow { .. } => {
							if let Some(window) = app.native_window() {
								router.surface_created(window);
							}
						}
						MainEvent::WindowResized { .. } => {
							if let Some(window) = app.native_window() {
								router.surface_changed(window);
							}
						}
						MainEvent::TerminateWindow { .. } => router.surface_destroyed(),
						MainEvent::Destroy => {
							// The display plugin goes down before the runtime,
							// surface teardown first.
							router.destroy();
							forwarder.handle(LifecycleEvent::Destroy);
						}
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
