use crate::driver::DriverHandle;
use crate::runtime::work_stealing::injector::InjectorHandle;
use crate::runtime::work_stealing::queue::LocalQueue;

use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    /// Handle to the timer driver of the runtime this thread belongs to.
    pub(crate) static CURRENT_DRIVER: RefCell<Option<DriverHandle>> =
        const { RefCell::new(None) };

    /// Handle to the global injector queue.
    pub(crate) static CURRENT_INJECTOR: RefCell<Option<InjectorHandle>> =
        const { RefCell::new(None) };

    /// Identifier of the current worker thread, if this is one.
    pub(crate) static CURRENT_WORKER_ID: RefCell<Option<usize>> =
        const { RefCell::new(None) };

    /// Local queues of every worker, indexed by worker id.
    pub(crate) static CURRENT_LOCALS: RefCell<Option<Arc<Vec<Arc<LocalQueue>>>>> =
        const { RefCell::new(None) };
}

/// Runs `f` with the runtime context installed on the current thread.
///
/// The previous context is restored afterwards, so contexts nest.
pub(crate) fn enter_context<R>(
    driver: DriverHandle,
    injector: InjectorHandle,
    f: impl FnOnce() -> R,
) -> R {
    let prev_driver = CURRENT_DRIVER.with(|d| d.replace(Some(driver)));
    let prev_injector = CURRENT_INJECTOR.with(|i| i.replace(Some(injector)));

    let _restore = Restore {
        driver: Some(prev_driver),
        injector: Some(prev_injector),
    };

    f()
}

/// Returns the injector of the current runtime, if any.
pub(crate) fn current_injector() -> Option<InjectorHandle> {
    CURRENT_INJECTOR.with(|cell| cell.borrow().clone())
}

/// Returns the driver of the current runtime, if any.
pub(crate) fn current_driver() -> Option<DriverHandle> {
    CURRENT_DRIVER.with(|cell| cell.borrow().clone())
}

/// Puts the previous context back, even if `f` unwinds.
struct Restore {
    driver: Option<Option<DriverHandle>>,
    injector: Option<Option<InjectorHandle>>,
}

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(prev) = self.injector.take() {
            CURRENT_INJECTOR.with(|i| i.replace(prev));
        }
        if let Some(prev) = self.driver.take() {
            CURRENT_DRIVER.with(|d| d.replace(prev));
        }
    }
}
