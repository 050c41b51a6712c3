pub mod mock_catalogue;

use cirrus::content::ContentProvider;
use cirrus::daemon::Daemon;
use cirrus::players::NullPlayer;
use cirrus::store::Store;
use self::mock_catalogue::MockCatalogue;
use std::sync::Arc;
use tempfile::TempDir;

/// Everything a protocol test needs: the daemon under test, the mock
/// catalogue feeding it, the null player recording what got played, and
/// the temp dir keeping the store alive.
pub struct TestContext {
    pub daemon: Arc<Daemon>,
    pub catalogue: Arc<MockCatalogue>,
    pub player: Arc<NullPlayer>,
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let catalogue = Arc::new(MockCatalogue::new());
        let store =
            Store::open(&temp_dir.path().join("catalogue.db")).expect("Failed to open store");
        let content = Arc::new(ContentProvider::new(
            catalogue.clone(),
            store,
            100,
            "test-device",
        ));
        let (player, _events) = NullPlayer::new();
        let player = Arc::new(player);
        let daemon = Arc::new(Daemon::new(content, player.clone()));
        Self {
            daemon,
            catalogue,
            player,
            temp_dir,
        }
    }

    /// Feed one line and return the response, panicking if the daemon
    /// swallowed it (command-list buffering).
    pub async fn send(&self, line: &str) -> String {
        self.daemon
            .handle_line(line)
            .await
            .unwrap_or_else(|| panic!("no response for '{}'", line))
    }

    /// Feed one line expecting no response (command-list buffering).
    pub async fn send_quiet(&self, line: &str) {
        if let Some(response) = self.daemon.handle_line(line).await {
            panic!("unexpected response for '{}': {}", line, response);
        }
    }
}
