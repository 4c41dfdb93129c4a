use anyhow::Context;
use rethread_core::config::Config;
use rethread_core::notice::{self, Notice, NoticeKind};
use rethread_core::tracker::Tracker;
use std::path::Path;
use std::sync::mpsc::Receiver;

/// A tracker opened for one command. Notices raised while the command runs
/// are printed to stderr when the session is dropped.
pub struct Session {
    pub tracker: Tracker,
    notices: Receiver<Notice>,
}

impl Session {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;
        let (notifier, notices) = notice::channel();
        let tracker = Tracker::open(root, &config, notifier);
        Ok(Self { tracker, notices })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for notice in self.notices.try_iter() {
            // The command's own error already names the bad reference.
            if notice.kind != NoticeKind::UnknownReference {
                eprintln!("{notice}");
            }
        }
    }
}
