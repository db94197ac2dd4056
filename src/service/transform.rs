//! Content transformation.
//!
//! Builds the destination payload for one source message: a descriptive embed
//! attributing the original author, the attachments (re-uploaded or linked) and
//! clones of the message's own embeds, in that order.

use regex::Regex;
use std::sync::LazyLock;

use crate::{
    data::discord::DirectoryClient,
    error::{internal::InternalError, AppError},
    model::discord::{
        Author, EmbedPayload, FilePayload, OutgoingMessage, SourceAttachment, SourceEmbed,
        SourceMessage,
    },
};

static ROLE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@&\d+>").expect("static regex compile"));

/// Removes role mentions so migrated messages never ping destination roles.
pub fn strip_role_mentions(content: &str) -> String {
    ROLE_MENTION.replace_all(content, "").into_owned()
}

pub struct ContentTransformer<'a> {
    client: &'a dyn DirectoryClient,
    reupload_attachments: bool,
}

impl<'a> ContentTransformer<'a> {
    /// Creates a new ContentTransformer.
    ///
    /// # Arguments
    /// - `client` - Directory client used to download attachments
    /// - `reupload_attachments` - Download and re-upload attachments instead of
    ///   linking them
    ///
    /// # Returns
    /// - `ContentTransformer` - New transformer instance
    pub fn new(client: &'a dyn DirectoryClient, reupload_attachments: bool) -> Self {
        Self {
            client,
            reupload_attachments,
        }
    }

    /// Builds the destination payload for a source message.
    ///
    /// Attachment download failures are logged and the attachment dropped; the rest of
    /// the payload is still produced.
    ///
    /// # Arguments
    /// - `message` - Source message
    /// - `author` - Attribution, reconstructed from raw data for author-less messages
    ///
    /// # Returns
    /// - `Ok(OutgoingMessage)` - Payload ready for creation
    /// - `Err(AppError::InternalErr)` - A source embed is malformed
    pub async fn transform(
        &self,
        message: &SourceMessage,
        author: &Author,
    ) -> Result<OutgoingMessage, AppError> {
        let cloned = message
            .embeds
            .iter()
            .map(|embed| clone_embed(message.id, embed))
            .collect::<Result<Vec<_>, _>>()?;

        let content = strip_role_mentions(&message.content);
        let mut descriptive = EmbedPayload {
            author: Some((
                author.display_name.clone(),
                None,
                Some(author.avatar_url.clone()),
            )),
            description: Some(content).filter(|content| !content.trim().is_empty()),
            timestamp: Some(message.effective_timestamp()),
            ..EmbedPayload::default()
        };

        let mut outgoing = OutgoingMessage::default();
        if self.reupload_attachments {
            outgoing.files = self.download_attachments(message).await;
            outgoing.embeds.push(descriptive);
        } else {
            let mut supplementary = Vec::new();
            for attachment in &message.attachments {
                if attachment.is_image() && descriptive.image.is_none() {
                    descriptive.image = Some(attachment.url.clone());
                } else {
                    supplementary.push(link_embed(attachment));
                }
            }
            outgoing.embeds.push(descriptive);
            outgoing.embeds.extend(supplementary);
        }
        outgoing.embeds.extend(cloned);

        Ok(outgoing)
    }

    async fn download_attachments(&self, message: &SourceMessage) -> Vec<FilePayload> {
        let mut files = Vec::new();

        for attachment in &message.attachments {
            match self.client.fetch_attachment(&attachment.url).await {
                Ok(data) => files.push(FilePayload {
                    filename: attachment.filename.clone(),
                    data,
                }),
                Err(AppError::AttachmentHttp { status, body }) => tracing::warn!(
                    "Attachment HTTP error {} for {} ({}):\n\t{}",
                    status,
                    attachment.filename,
                    message.log_id(),
                    body.replace('\n', "\n\t")
                ),
                Err(e) => tracing::warn!(
                    "Unable to forward attachment {} ({}): {}",
                    attachment.filename,
                    message.log_id(),
                    e
                ),
            }
        }

        files
    }
}

/// Embed standing in for an attachment that is linked rather than uploaded.
fn link_embed(attachment: &SourceAttachment) -> EmbedPayload {
    if attachment.is_image() {
        EmbedPayload {
            image: Some(attachment.url.clone()),
            ..EmbedPayload::default()
        }
    } else {
        EmbedPayload {
            title: Some(attachment.filename.clone()),
            url: Some(attachment.url.clone()),
            ..EmbedPayload::default()
        }
    }
}

/// Copies a source embed field for field.
///
/// # Returns
/// - `Ok(EmbedPayload)` - The clone
/// - `Err(AppError::InternalErr)` - The embed has an author without a name
pub fn clone_embed(message_id: u64, embed: &SourceEmbed) -> Result<EmbedPayload, AppError> {
    let author = match &embed.author {
        Some(author) => {
            let name = author
                .name
                .clone()
                .ok_or(InternalError::EmbedAuthorWithoutName { message_id })?;
            Some((name, author.url.clone(), author.icon_url.clone()))
        }
        None => None,
    };

    Ok(EmbedPayload {
        author,
        title: embed.title.clone(),
        url: embed.url.clone(),
        color: embed.color,
        thumbnail: embed.thumbnail.clone(),
        description: embed.description.clone(),
        image: embed.image.clone(),
        fields: embed.fields.clone(),
        timestamp: embed.timestamp,
        footer: embed
            .footer
            .as_ref()
            .map(|footer| (footer.text.clone(), footer.icon_url.clone())),
    })
}
