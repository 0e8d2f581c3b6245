use log::{debug, trace};

/// Activity lifecycle callbacks, in the order the OS delivers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
	Create,
	Resume,
	Pause,
	Destroy,
}

/// Native entry points for one app runtime. Calls cross the FFI boundary
/// and have no error channel back into this layer.
pub trait AppRuntime {
	fn on_create(&mut self);
	fn on_resume(&mut self);
	fn on_pause(&mut self);
	fn on_destroy(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Idle,
	Created,
	Resumed,
	Paused,
	Destroyed,
}

/// Forwards each OS lifecycle callback to the runtime exactly once, in
/// delivery order. Events that are invalid for the current phase (a repeated
/// resume, anything after destroy) are dropped instead of forwarded twice.
pub struct LifecycleForwarder<R: AppRuntime> {
	runtime: R,
	phase: Phase,
}

impl<R: AppRuntime> LifecycleForwarder<R> {
	pub fn new(runtime: R) -> Self {
		LifecycleForwarder {
			runtime,
			phase: Phase::Idle,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn handle(&mut self, event: LifecycleEvent) {
		trace!("lifecycle event {event:?} in phase {:?}", self.phase);
		match (self.phase, event) {
			(Phase::Idle, LifecycleEvent::Create) => {
				self.runtime.on_create();
				self.phase = Phase::Created;
			}
			(Phase::Created | Phase::Paused, LifecycleEvent::Resume) => {
				self.runtime.on_resume();
				self.phase = Phase::Resumed;
			}
			(Phase::Resumed, LifecycleEvent::Pause) => {
				self.runtime.on_pause();
				self.phase = Phase::Paused;
			}
			(Phase::Created | Phase::Resumed | Phase::Paused, LifecycleEvent::Destroy) => {
				self.runtime.on_destroy();
				self.phase = Phase::Destroyed;
			}
			(phase, event) => debug!("dropping {event:?} in phase {phase:?}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::rc::Rc;

	struct RecordingRuntime(Rc<RefCell<Vec<&'static str>>>);

	impl AppRuntime for RecordingRuntime {
		fn on_create(&mut self) {
			self.0.borrow_mut().push("create");
		}
		fn on_resume(&mut self) {
			self.0.borrow_mut().push("resume");
		}
		fn on_pause(&mut self) {
			self.0.borrow_mut().push("pause");
		}
		fn on_destroy(&mut self) {
			self.0.borrow_mut().push("destroy");
		}
	}

	fn forwarder() -> (LifecycleForwarder<RecordingRuntime>, Rc<RefCell<Vec<&'static str>>>) {
		let log = Rc::new(RefCell::new(Vec::new()));
		(LifecycleForwarder::new(RecordingRuntime(log.clone())), log)
	}

	#[test]
	fn forwards_in_delivery_order() {
		let (mut forwarder, log) = forwarder();
		for event in [
			LifecycleEvent::Create,
			LifecycleEvent::Resume,
			LifecycleEvent::Pause,
			LifecycleEvent::Resume,
			LifecycleEvent::Pause,
			LifecycleEvent::Destroy,
		] {
			forwarder.handle(event);
		}
		assert_eq!(
			*log.borrow(),
			vec!["create", "resume", "pause", "resume", "pause", "destroy"]
		);
		assert_eq!(forwarder.phase(), Phase::Destroyed);
	}

	#[test]
	fn duplicate_events_are_not_forwarded_twice() {
		let (mut forwarder, log) = forwarder();
		forwarder.handle(LifecycleEvent::Create);
		forwarder.handle(LifecycleEvent::Resume);
		forwarder.handle(LifecycleEvent::Resume);
		assert_eq!(*log.borrow(), vec!["create", "resume"]);
	}

	#[test]
	fn nothing_is_forwarded_before_create_or_after_destroy() {
		let (mut forwarder, log) = forwarder();
		forwarder.handle(LifecycleEvent::Pause);
		forwarder.handle(LifecycleEvent::Resume);
		assert!(log.borrow().is_empty());

		forwarder.handle(LifecycleEvent::Create);
		forwarder.handle(LifecycleEvent::Destroy);
		forwarder.handle(LifecycleEvent::Resume);
		forwarder.handle(LifecycleEvent::Create);
		assert_eq!(*log.borrow(), vec!["create", "destroy"]);
	}
}
