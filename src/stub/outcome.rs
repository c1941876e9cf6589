/// How a stub run ends
///
/// `Abort` is a fault the request asked for, not a failure of the stub
/// itself. The process wrapper turns it into an abnormal termination that
/// cannot be confused with any `Exit` code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubOutcome {
    /// Normal exit with a status in 0..=255
    Exit(u8),
    /// Abnormal termination carrying the requested message
    Abort(String),
}

impl StubOutcome {
    pub fn is_abort(&self) -> bool {
        matches!(self, StubOutcome::Abort(_))
    }

    pub fn exit_code(&self) -> Option<u8> {
        match self {
            StubOutcome::Exit(code) => Some(*code),
            StubOutcome::Abort(_) => None,
        }
    }
}
