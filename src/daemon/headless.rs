use std::{io::Write, sync::Arc};

use super::{
    detach::Daemonizer,
    progress::ProgressRenderer,
    redirect::OutputRedirector,
    run_loop,
    sys::{Libc, ProcessControl},
};
use crate::{
    cli::DaemonConfig,
    core::{CancellationToken, DaemonResult, MessageQueue, UiOps},
};

/// Front-end used when running without a terminal.
///
/// - `init` detaches the process
/// - `start` idles, draining the message queue
/// - `cleanup` binds the standard streams to the diagnostic log
/// - messages are discarded (they are already in the debug log)
/// - progress is drawn on stderr
pub struct HeadlessUi {
    config: DaemonConfig,
    sys: Arc<dyn ProcessControl>,
    redirector: OutputRedirector,
    renderer: ProgressRenderer,
}

impl HeadlessUi {
    pub fn new(config: DaemonConfig) -> Self {
        Self::with_parts(config, Arc::new(Libc), ProgressRenderer::stderr())
    }

    pub fn with_parts(
        config: DaemonConfig,
        sys: Arc<dyn ProcessControl>,
        renderer: ProgressRenderer,
    ) -> Self {
        let redirector = OutputRedirector::new(&config.diagnostic_log, &config.program);
        Self {
            config,
            sys,
            redirector,
            renderer,
        }
    }

    /// Same as [`HeadlessUi::with_parts`] with progress written to `out`.
    pub fn with_progress_output(
        config: DaemonConfig,
        sys: Arc<dyn ProcessControl>,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self::with_parts(config, sys, ProgressRenderer::new(out))
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }
}

impl UiOps for HeadlessUi {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn init(&self) -> DaemonResult<()> {
        if self.config.foreground {
            log::info!("{} running in foreground, not detaching", self.config.program);
        } else {
            Daemonizer::new(&self.config.program, self.config.strategy).run(self.sys.as_ref())?;
            log::info!("{} detached, pid {}", self.config.program, std::process::id());
        }
        Ok(())
    }

    fn start(&self, queue: &MessageQueue, cancel: &CancellationToken) -> DaemonResult<()> {
        run_loop::run(
            queue,
            cancel,
            self.config.flush_interval(),
            self.config.flush_batch,
            |msg| self.message(msg),
        );
        Ok(())
    }

    fn cleanup(&self) -> DaemonResult<()> {
        self.redirector.redirect(self.sys.as_ref())
    }

    fn message(&self, msg: &str) {
        log::debug!("{msg}");
    }

    fn progress(&self, value: u64, max: u64) {
        self.renderer.draw(value, max);
    }
}
