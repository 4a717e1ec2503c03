use hiro_system_kit::Logger;

/// Carries the optional logger through the engine.
///
/// Without a logger every logging call is a no-op, which is what tests and
/// embedders that don't care about logs get from [`Context::empty`].
#[derive(Clone, Default)]
pub struct Context {
    pub logger: Option<Logger>,
}

impl Context {
    pub fn empty() -> Context {
        Context { logger: None }
    }

    pub fn new(logger: Logger) -> Context {
        Context { logger: Some(logger) }
    }

    pub fn try_log<F>(&self, closure: F)
    where
        F: FnOnce(&Logger),
    {
        if let Some(ref logger) = self.logger {
            closure(logger)
        }
    }

    pub fn try_info(&self, message: impl AsRef<str>) {
        self.try_log(|logger| info!(logger, "{}", message.as_ref()));
    }

    pub fn try_warn(&self, message: impl AsRef<str>) {
        self.try_log(|logger| warn!(logger, "{}", message.as_ref()));
    }

    pub fn try_error(&self, message: impl AsRef<str>) {
        self.try_log(|logger| error!(logger, "{}", message.as_ref()));
    }
}
