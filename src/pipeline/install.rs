//! Install-once guard for process-wide gate wiring.
//!
//! UI layers tend to re-run their setup routines (re-mounts, hot reloads).
//! [`GateSlot`] accepts the first gate it is handed and reports every later
//! attempt, so a re-run can never wire a second pipeline whose parallel
//! refreshes would bypass the single-flight episode of the first.

// self
use crate::{_prelude::*, http::Transport, pipeline::Gate};

/// Result of an installation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
	/// The slot was empty; this gate now serves the process.
	Installed,
	/// A gate was already installed; the new one was dropped.
	AlreadyInstalled,
}

/// Write-once slot holding the process-wide gate.
///
/// Typically lives in a `static` at the application layer; the slot itself
/// carries no global state, so tests can create as many as they like.
pub struct GateSlot<C>
where
	C: ?Sized + Transport,
{
	cell: AsyncOnceCell<Gate<C>>,
}
impl<C> GateSlot<C>
where
	C: ?Sized + Transport,
{
	/// Creates an empty slot.
	pub const fn new() -> Self {
		Self { cell: AsyncOnceCell::new() }
	}

	/// Installs a gate unless one is already present.
	pub fn install(&self, gate: Gate<C>) -> InstallOutcome {
		match self.cell.set_blocking(gate) {
			Ok(_) => InstallOutcome::Installed,
			Err(_) => InstallOutcome::AlreadyInstalled,
		}
	}

	/// Returns the installed gate, if any.
	pub fn get(&self) -> Option<&Gate<C>> {
		self.cell.get()
	}
}
impl<C> Default for GateSlot<C>
where
	C: ?Sized + Transport,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<C> Debug for GateSlot<C>
where
	C: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("GateSlot").field("installed", &self.cell.get().is_some()).finish()
	}
}
