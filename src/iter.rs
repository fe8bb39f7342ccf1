//! Paged iteration over the accounts collection
//!
//! Calls a handler once per matching account, in ascending id order,
//! honouring an initial skip and a maximum count. The first handler error
//! stops the run and is returned as-is.

use crate::{Error, Result};
use crate::account::{Account, AccountFilter};
use crate::storage::MigrationStore;

/// Default number of accounts fetched per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Options controlling one iteration
#[derive(Debug, Clone)]
pub struct IterOptions {
    pub filter: AccountFilter,
    /// Matching accounts to skip before the first callback
    pub skip: usize,
    /// Maximum number of callbacks
    pub limit: usize,
    pub page_size: usize,
}

impl Default for IterOptions {
    fn default() -> Self {
        Self {
            filter: AccountFilter::all(),
            skip: 0,
            limit: 1000,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Run `handler` over every account selected by `options`.
///
/// Returns the number of accounts handed to the handler. A skip beyond what
/// the store can address is a configuration error.
pub fn iter_accounts<S, F>(store: &S, options: &IterOptions, mut handler: F) -> Result<usize>
where
    S: MigrationStore + ?Sized,
    F: FnMut(&Account) -> Result<()>,
{
    if i64::try_from(options.skip).is_err() {
        return Err(Error::Config(format!("skip {} is out of range", options.skip)));
    }

    let page_size = options.page_size.max(1);
    let mut visited = 0;
    let mut offset = options.skip;

    while visited < options.limit {
        let want = page_size.min(options.limit - visited);
        let page = store.accounts_page(&options.filter, offset, want)?;
        tracing::debug!("Fetched {} accounts at offset {}", page.len(), offset);

        let fetched = page.len();
        for account in &page {
            handler(account)?;
            visited += 1;
        }

        if fetched < want {
            break;
        }
        offset = match offset.checked_add(fetched) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(visited)
}
