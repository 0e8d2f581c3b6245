//! Frame playback diagnostic shell: no permission gate and no asset cache,
//! just the player's create entry plus surface routing into the frame
//! renderer.

#[cfg(target_os = "android")]
mod shell {
	use android_activity::{AndroidApp, MainEvent, PollEvent};
	use log::info;
	use ndk::native_window::NativeWindow;
	use starbridge::surface::{DisplayPlugin, SurfaceRouter};
	use std::os::raw::c_void;
	use std::time::Duration;

	extern "C" {
		fn frame_player_on_create();

		fn frame_render_on_create() -> u64;
		fn frame_render_on_resume(handle: u64);
		fn frame_render_on_pause(handle: u64);
		fn frame_render_on_destroy(handle: u64);
		fn frame_render_on_surface_created(handle: u64, window: *mut c_void);
		fn frame_render_on_surface_changed(handle: u64, window: *mut c_void);
		fn frame_render_on_surface_destroyed(handle: u64);
	}

	struct FrameRenderPlugin {
		handle: u64,
	}

	impl FrameRenderPlugin {
		fn create() -> Self {
			FrameRenderPlugin {
				handle: unsafe { frame_render_on_create() },
			}
		}
	}

	impl DisplayPlugin for FrameRenderPlugin {
		type Surface = NativeWindow;

		fn resumed(&mut self) {
			unsafe { frame_render_on_resume(self.handle) }
		}
		fn paused(&mut self) {
			unsafe { frame_render_on_pause(self.handle) }
		}
		fn surface_created(&mut self, surface: NativeWindow) {
			unsafe { frame_render_on_surface_created(self.handle, surface.ptr().as_ptr().cast()) }
		}
		fn surface_changed(&mut self, surface: NativeWindow) {
			unsafe { frame_render_on_surface_changed(self.handle, surface.ptr().as_ptr().cast()) }
		}
		fn surface_destroyed(&mut self) {
			unsafe { frame_render_on_surface_destroyed(self.handle) }
		}
	}

	impl Drop for FrameRenderPlugin {
		fn drop(&mut self) {
			unsafe { frame_render_on_destroy(self.handle) }
		}
	}

	pub fn main(app: AndroidApp) {
		android_logger::init_once(
			android_logger::Config::default()
				.with_max_level(log::LevelFilter::Info)
				.with_tag("frame_player"),
		);

		unsafe { frame_player_on_create() }
		info!("frame player created, routing surface events");
		let mut router = SurfaceRouter::new(FrameRenderPlugin::create());

		while router.is_active() {
			app.poll_events(Some(Duration::from_millis(100)), |event| {
				if let PollEvent::Main(event) = event {
					match event {
						MainEvent::Resume { .. } => router.resumed(),
						MainEvent::Pause => router.paused(),
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
						MainEvent::Destroy => router.destroy(),
						_ => {}
					}
				}
			});
		}
	}
}

#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(app: android_activity::AndroidApp) {
	shell::main(app);
}
