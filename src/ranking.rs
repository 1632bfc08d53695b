use crate::logging::Logger;
use crate::models::ImageRecord;
use crate::registry::RegistryApi;

/// How many of a repository's most recently pushed tags get refreshed.
pub const RECENT_TAG_LIMIT: usize = 3;

/// The repository's most recent tags, newest first. A listing failure is
/// logged and reported as "no tags" so the run can move on to the next
/// repository.
pub async fn rank_tags(registry: &dyn RegistryApi, repo: &str, logger: &Logger) -> Vec<String> {
    match registry.list_tagged_images(repo).await {
        Ok(images) => select_recent_tags(images),
        Err(e) => {
            logger.error(format!("Failed to list image tags for {}: {:#}", repo, e));
            Vec::new()
        }
    }
}

/// Order images newest push first and walk their tags until the limit is
/// reached. Images with no push time sort last. Ordering compares whole
/// seconds and the sort is stable, so images pushed within the same second
/// keep the order the registry returned them in; within one image, tags
/// keep their listed order.
pub fn select_recent_tags(mut images: Vec<ImageRecord>) -> Vec<String> {
    if images.is_empty() {
        return Vec::new();
    }

    images.sort_by(|a, b| {
        let a_time = a.pushed_at.map(|t| t.timestamp()).unwrap_or(i64::MIN);
        let b_time = b.pushed_at.map(|t| t.timestamp()).unwrap_or(i64::MIN);
        b_time.cmp(&a_time)
    });

    let mut tags: Vec<String> = Vec::new();
    'images: for image in &images {
        for tag in &image.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
            if tags.len() == RECENT_TAG_LIMIT {
                break 'images;
            }
        }
    }

    tags
}
