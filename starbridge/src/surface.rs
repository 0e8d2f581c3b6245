use log::debug;

/// Native display plugin entry points. Implementations hold the plugin
/// handle returned by the native create entry and release it on drop. The
/// surface handle belongs to the OS and is passed through verbatim.
pub trait DisplayPlugin {
	type Surface;

	fn resumed(&mut self);
	fn paused(&mut self);
	fn surface_created(&mut self, surface: Self::Surface);
	fn surface_changed(&mut self, surface: Self::Surface);
	fn surface_destroyed(&mut self);
}

/// Routes surface and pause/resume events to a display plugin for as long as
/// the plugin is alive.
///
/// Destroy notifications precede surface-handle invalidation, so teardown
/// forwards a final `surface_destroyed` for a still-live surface before the
/// plugin is dropped. After [`SurfaceRouter::destroy`] every event is
/// ignored.
pub struct SurfaceRouter<P: DisplayPlugin> {
	plugin: Option<P>,
	surface_live: bool,
}

impl<P: DisplayPlugin> SurfaceRouter<P> {
	pub fn new(plugin: P) -> Self {
		SurfaceRouter {
			plugin: Some(plugin),
			surface_live: false,
		}
	}

	pub fn is_active(&self) -> bool {
		self.plugin.is_some()
	}

	pub fn surface_live(&self) -> bool {
		self.surface_live
	}

	pub fn resumed(&mut self) {
		if let Some(plugin) = self.plugin.as_mut() {
			plugin.resumed();
		}
	}

	pub fn paused(&mut self) {
		if let Some(plugin) = self.plugin.as_mut() {
			plugin.paused();
		}
	}

	pub fn surface_created(&mut self, surface: P::Surface) {
		match self.plugin.as_mut() {
			Some(plugin) => {
				plugin.surface_created(surface);
				self.surface_live = true;
			}
			None => debug!("surface created after plugin teardown, dropping"),
		}
	}

	pub fn surface_changed(&mut self, surface: P::Surface) {
		match self.plugin.as_mut() {
			Some(plugin) => {
				plugin.surface_changed(surface);
				self.surface_live = true;
			}
			None => debug!("surface changed after plugin teardown, dropping"),
		}
	}

	pub fn surface_destroyed(&mut self) {
		if let Some(plugin) = self.plugin.as_mut() {
			plugin.surface_destroyed();
		}
		self.surface_live = false;
	}

	/// OS destroy callback. The plugin is dropped here and its native handle
	/// released; a surface that is still live gets its destroy notification
	/// first.
	pub fn destroy(&mut self) {
		if let Some(mut plugin) = self.plugin.take() {
			if self.surface_live {
				plugin.surface_destroyed();
				self.surface_live = false;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::rc::Rc;

	struct RecordingPlugin(Rc<RefCell<Vec<String>>>);

	impl DisplayPlugin for RecordingPlugin {
		type Surface = u64;

		fn resumed(&mut self) {
			self.0.borrow_mut().push("resumed".to_string());
		}
		fn paused(&mut self) {
			self.0.borrow_mut().push("paused".to_string());
		}
		fn surface_created(&mut self, surface: u64) {
			self.0.borrow_mut().push(format!("created {surface}"));
		}
		fn surface_changed(&mut self, surface: u64) {
			self.0.borrow_mut().push(format!("changed {surface}"));
		}
		fn surface_destroyed(&mut self) {
			self.0.borrow_mut().push("destroyed".to_string());
		}
	}

	impl Drop for RecordingPlugin {
		fn drop(&mut self) {
			self.0.borrow_mut().push("dropped".to_string());
		}
	}

	fn router() -> (SurfaceRouter<RecordingPlugin>, Rc<RefCell<Vec<String>>>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		(SurfaceRouter::new(RecordingPlugin(log.clone())), log)
	}

	#[test]
	fn passes_surface_handles_through_verbatim() {
		let (mut router, log) = router();
		router.surface_created(7);
		router.surface_changed(7);
		router.surface_destroyed();
		assert_eq!(*log.borrow(), vec!["created 7", "changed 7", "destroyed"]);
		assert!(!router.surface_live());
	}

	#[test]
	fn destroy_notifies_a_live_surface_before_dropping_the_plugin() {
		let (mut router, log) = router();
		router.surface_created(7);
		router.destroy();
		assert_eq!(*log.borrow(), vec!["created 7", "destroyed", "dropped"]);
		assert!(!router.is_active());
	}

	#[test]
	fn destroy_after_surface_teardown_skips_the_extra_notification() {
		let (mut router, log) = router();
		router.surface_created(7);
		router.surface_destroyed();
		router.destroy();
		assert_eq!(*log.borrow(), vec!["created 7", "destroyed", "dropped"]);
	}

	#[test]
	fn events_after_destroy_are_ignored() {
		let (mut router, log) = router();
		router.destroy();
		router.surface_created(7);
		router.surface_changed(7);
		router.resumed();
		router.paused();
		router.surface_destroyed();
		assert_eq!(*log.borrow(), vec!["dropped"]);
		assert!(!router.surface_live());
	}
}
