// Bridges the controller task and the draw loop
use repofinder_core::{PageView, Surface};
use tokio::sync::watch;

/// Latest frame plus a counter bumped whenever the search box must be emptied
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub page: PageView,
    pub form_resets: u64,
}

/// Publishes controller output on a watch channel; the UI only ever needs the newest frame
pub struct WatchSurface {
    tx: watch::Sender<Snapshot>,
}

impl WatchSurface {
    pub fn channel() -> (Self, watch::Receiver<Snapshot>) {
        let (tx, rx) = watch::channel(Snapshot::default());
        (Self { tx }, rx)
    }
}

impl Surface for WatchSurface {
    fn reset_search_form(&mut self) {
        self.tx.send_modify(|snap| snap.form_resets += 1);
    }

    fn render(&mut self, page: &PageView) {
        self.tx.send_modify(|snap| snap.page = page.clone());
    }
}
