use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::drawing::DrawingCore;
use crate::state::GraphicsState;

/// A state setter bound to a drawing rather than to one graphics state.
///
/// Every call looks up the state that is current at that moment, so a
/// delegate taken before `saved_state` or `new_page` keeps acting on the
/// live state afterwards.
pub struct Delegate<A, R = ()> {
    core: Rc<RefCell<DrawingCore>>,
    method: fn(&mut GraphicsState, A) -> R,
}

impl<A, R> Delegate<A, R> {
    pub(crate) fn new(core: Rc<RefCell<DrawingCore>>, method: fn(&mut GraphicsState, A) -> R) -> Self {
        Delegate { core, method }
    }

    pub fn call(&self, arg: impl Into<A>) -> R {
        let mut core = self.core.borrow_mut();
        (self.method)(core.gstate_mut(), arg.into())
    }
}

impl<A, R> Clone for Delegate<A, R> {
    fn clone(&self) -> Self {
        Delegate {
            core: self.core.clone(),
            method: self.method,
        }
    }
}

impl<A, R> fmt::Debug for Delegate<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegate")
            .field("method", &(self.method as *const ()))
            .finish()
    }
}
