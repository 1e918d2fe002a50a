/// Guard for destructive actions: a request, then two confirmations.
///
/// Anything other than a confirmation in between drops the pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmGate<A> {
    Clear,
    /// Requested; waiting for the first confirmation
    Requested(A),
    /// Confirmed once; the next confirmation carries it out
    Confirming(A),
}

/// What a confirmation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmed<A> {
    /// Nothing was pending
    Nothing,
    /// First confirmation recorded, one more required
    Again(A),
    /// Second confirmation; the action should run now
    Proceed(A),
}

impl<A: Copy> ConfirmGate<A> {
    pub fn request(&mut self, action: A) {
        *self = ConfirmGate::Requested(action);
    }

    pub fn confirm(&mut self) -> Confirmed<A> {
        match *self {
            ConfirmGate::Clear => Confirmed::Nothing,
            ConfirmGate::Requested(a) => {
                *self = ConfirmGate::Confirming(a);
                Confirmed::Again(a)
            }
            ConfirmGate::Confirming(a) => {
                *self = ConfirmGate::Clear;
                Confirmed::Proceed(a)
            }
        }
    }

    /// Drops the pending action, returning it if there was one
    pub fn cancel(&mut self) -> Option<A> {
        let pending = self.pending();
        *self = ConfirmGate::Clear;
        pending
    }

    pub fn pending(&self) -> Option<A> {
        match *self {
            ConfirmGate::Clear => None,
            ConfirmGate::Requested(a) | ConfirmGate::Confirming(a) => Some(a),
        }
    }

    pub fn is_final_step(&self) -> bool {
        matches!(self, ConfirmGate::Confirming(_))
    }
}

impl<A> Default for ConfirmGate<A> {
    fn default() -> Self {
        ConfirmGate::Clear
    }
}
