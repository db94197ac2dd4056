use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    data::discord::memory::InMemoryDirectory,
    model::{
        discord::{DirectoryChannel, TextChannel},
        migration::ChannelState,
        scope::MigrationScope,
    },
    service::{clean::CleanService, marker::MIGRATED_EMOJI, migrate::MigrationService},
};


/// Source and destination guilds sharing one in-memory directory.
struct Guilds {
    directory: Arc<InMemoryDirectory>,
    source: u64,
    destination: u64,
}

async fn guilds() -> Guilds {
    let directory = Arc::new(InMemoryDirectory::new());
    let source = directory.add_guild("Source").await;
    let destination = directory.add_guild("Destination").await;

    Guilds {
        directory,
        source,
        destination,
    }
}

impl Guilds {
    fn migration(&self, scope: MigrationScope) -> MigrationService {
        MigrationService::new(self.directory.clone(), scope, CancellationToken::new())
    }

    fn cleanup(&self, scope: MigrationScope) -> CleanService {
        CleanService::new(self.directory.clone(), scope, CancellationToken::new())
    }

    /// The only text channel of the destination with this name.
    async fn destination_text(&self, name: &str) -> TextChannel {
        let channels: Vec<TextChannel> = self
            .directory
            .channels_named(self.destination, name)
            .await
            .iter()
            .filter_map(DirectoryChannel::as_text)
            .cloned()
            .collect();
        assert_eq!(channels.len(), 1, "expected one destination #{}", name);
        channels[0].clone()
    }

    async fn markers(&self, channel_id: u64) -> usize {
        self.directory
            .own_reaction_count(channel_id, MIGRATED_EMOJI)
            .await
    }
}

/// Scope used by most scenarios: defaults with a small, fixed worker count.
fn default_scope() -> MigrationScope {
    MigrationScope::builder().workers(Some(2)).build()
}
