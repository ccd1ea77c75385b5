//! Image acceptance and thumbnail selection for shared files.

use super::domain::AttachmentRef;
use super::gateway::SharedFile;

/// Rewrites privately hosted asset URLs onto the public proxy. A single
/// host substitution; with no proxy configured URLs pass through.
#[derive(Debug, Clone)]
pub struct MediaProxy {
    private_host: String,
    proxy_host: Option<String>,
}

impl MediaProxy {
    pub fn new(private_host: String, proxy_host: Option<String>) -> Self {
        Self {
            private_host,
            proxy_host,
        }
    }

    pub fn rewrite(&self, url: &str) -> String {
        match &self.proxy_host {
            Some(proxy) => url.replace(&self.private_host, proxy),
            None => url.to_string(),
        }
    }
}

/// What to do with a freshly shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaDecision {
    /// An image: prompt the owner to fill in the details.
    Accept(AttachmentRef),
    /// Not an image: warn the owner.
    Reject,
    /// Not an image, but on the allow-list (e.g. the bot's own help
    /// assets): stay silent.
    Exempt,
}

/// Applies the image gate and the thumbnail ladder.
#[derive(Debug, Clone)]
pub struct MediaPolicy {
    proxy: MediaProxy,
    exempt_file_ids: Vec<String>,
}

impl MediaPolicy {
    pub fn new(proxy: MediaProxy, exempt_file_ids: Vec<String>) -> Self {
        Self {
            proxy,
            exempt_file_ids,
        }
    }

    pub fn inspect(&self, file: &SharedFile) -> MediaDecision {
        if !is_image(&file.mimetype) {
            if self.exempt_file_ids.iter().any(|id| id == &file.id) {
                return MediaDecision::Exempt;
            }
            return MediaDecision::Reject;
        }

        let thumbnail = self.pick_thumbnail(file);
        MediaDecision::Accept(AttachmentRef {
            file_name: file.name.clone(),
            thumbnail_url: self.proxy.rewrite(&thumbnail),
            source_url: self.proxy.rewrite(&file.url_private),
        })
    }

    /// Widest thumbnail the original can fill: >=720 uses the 720 thumb,
    /// then 480, then 360, otherwise the private original.
    fn pick_thumbnail(&self, file: &SharedFile) -> String {
        let width = file.original_width.unwrap_or(0);
        let ladder = [
            (720, &file.thumb_720),
            (480, &file.thumb_480),
            (360, &file.thumb_360),
        ];
        for (floor, thumb) in ladder {
            if width >= floor {
                if let Some(url) = thumb {
                    return url.clone();
                }
            }
        }
        file.url_private.clone()
    }
}

fn is_image(mimetype: &str) -> bool {
    mimetype
        .parse::<mime::Mime>()
        .map(|parsed| parsed.type_() == mime::IMAGE)
        .unwrap_or(false)
}
