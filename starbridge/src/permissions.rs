use log::{info, warn};

/// OS capability grants the apps need before first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
	ReadStorage,
	WriteStorage,
	RecordAudio,
	Camera,
}

impl Permission {
	pub const REQUIRED: [Permission; 4] = [
		Permission::ReadStorage,
		Permission::WriteStorage,
		Permission::RecordAudio,
		Permission::Camera,
	];

	/// Android manifest identifier for this capability.
	pub fn android_name(self) -> &'static str {
		match self {
			Permission::ReadStorage => "android.permission.READ_EXTERNAL_STORAGE",
			Permission::WriteStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
			Permission::RecordAudio => "android.permission.RECORD_AUDIO",
			Permission::Camera => "android.permission.CAMERA",
		}
	}
}

/// Platform surface the gate runs against. The Android implementation goes
/// through JNI; tests use a fake.
pub trait PermissionHost {
	fn is_granted(&self, permission: Permission) -> bool;
	/// Present one batched request to the user and report per-permission
	/// grant results.
	fn request(&mut self, permissions: &[Permission]) -> Vec<(Permission, bool)>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
	/// Everything was granted before we asked.
	AlreadyGranted,
	Granted,
	Denied(Vec<Permission>),
}

impl GateOutcome {
	pub fn denied(&self) -> &[Permission] {
		match self {
			GateOutcome::Denied(denied) => denied,
			_ => &[],
		}
	}
}

/// Check the required set and, if anything is missing, request the whole set
/// in a single batch.
///
/// Denial never blocks: callers launch the gated activity whatever the
/// outcome. The denied set is returned so callers log what they are running
/// without.
pub fn run_gate(host: &mut dyn PermissionHost) -> GateOutcome {
	let missing: Vec<Permission> = Permission::REQUIRED
		.iter()
		.copied()
		.filter(|permission| !host.is_granted(*permission))
		.collect();
	if missing.is_empty() {
		return GateOutcome::AlreadyGranted;
	}

	info!("missing permissions {missing:?}, requesting the full set");
	let results = host.request(&Permission::REQUIRED);
	let denied: Vec<Permission> = results
		.into_iter()
		.filter(|(_, granted)| !granted)
		.map(|(permission, _)| permission)
		.collect();
	if denied.is_empty() {
		GateOutcome::Granted
	} else {
		warn!("user denied {denied:?}");
		GateOutcome::Denied(denied)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct FakeHost {
		granted: Vec<Permission>,
		grant_on_request: bool,
		requests: Vec<Vec<Permission>>,
	}

	impl FakeHost {
		fn with_granted(granted: &[Permission], grant_on_request: bool) -> Self {
			FakeHost {
				granted: granted.to_vec(),
				grant_on_request,
				requests: Vec::new(),
			}
		}
	}

	impl PermissionHost for FakeHost {
		fn is_granted(&self, permission: Permission) -> bool {
			self.granted.contains(&permission)
		}

		fn request(&mut self, permissions: &[Permission]) -> Vec<(Permission, bool)> {
			self.requests.push(permissions.to_vec());
			permissions
				.iter()
				.map(|&permission| {
					(
						permission,
						self.grant_on_request || self.granted.contains(&permission),
					)
				})
				.collect()
		}
	}

	#[test]
	fn fully_granted_set_is_never_requested_again() {
		let mut host = FakeHost::with_granted(&Permission::REQUIRED, false);
		assert_eq!(run_gate(&mut host), GateOutcome::AlreadyGranted);
		assert!(host.requests.is_empty());
	}

	#[test]
	fn any_missing_grant_requests_the_full_set_in_one_batch() {
		let mut host = FakeHost::with_granted(
			&[Permission::ReadStorage, Permission::WriteStorage, Permission::Camera],
			true,
		);
		assert_eq!(run_gate(&mut host), GateOutcome::Granted);
		assert_eq!(host.requests, vec![Permission::REQUIRED.to_vec()]);
	}

	#[test]
	fn denial_is_reported_but_does_not_block() {
		let mut host = FakeHost::with_granted(&[Permission::ReadStorage], false);
		let outcome = run_gate(&mut host);
		assert_eq!(
			outcome.denied(),
			&[
				Permission::WriteStorage,
				Permission::RecordAudio,
				Permission::Camera
			]
		);
		// run_gate returned: launching stays the caller's decision.
	}
}
