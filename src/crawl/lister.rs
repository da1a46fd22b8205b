use crate::api::ForgeApi;
use crate::error::{CrawlError, ValidationError};
use crate::types::Repository;

/// Repositories requested per page
pub const PAGE_SIZE: u32 = 100;

/// Fetch every repository of `organization`, following pages until one
/// comes back empty.
///
/// Any failed page aborts the whole listing. No partial result is returned
/// and nothing is retried.
pub async fn list_repositories(
    api: &dyn ForgeApi,
    organization: &str,
) -> Result<Vec<Repository>, CrawlError> {
    if organization.trim().is_empty() {
        return Err(ValidationError::Empty("organization".to_string()).into());
    }

    let mut repositories = Vec::new();
    let mut page = 1;

    loop {
        let batch = api
            .list_repositories_page(organization, page, PAGE_SIZE)
            .await
            .map_err(|source| CrawlError::Listing {
                organization: organization.to_string(),
                page,
                source,
            })?;

        if batch.is_empty() {
            break;
        }

        tracing::debug!(
            "Page {} of '{}' returned {} repositories",
            page,
            organization,
            batch.len()
        );
        repositories.extend(batch);
        page += 1;
    }

    tracing::info!(
        "Found {} repositories in '{}'",
        repositories.len(),
        organization
    );
    Ok(repositories)
}
