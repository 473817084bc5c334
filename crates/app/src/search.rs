//! Forward-only walk over the pages of a `find` query.

use crate::account_service::AccountService;
use crate::error::AccountResult;
use account_client_api::FieldSelection;
use account_client_domain::{MAX_PAGE, Page, User};
use account_client_shared::FieldBag;
use futures_util::Stream;
use futures_util::stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Start,
    Page(u32),
    Done,
}

/// Lazily fetches successive pages of users.
///
/// Each pulled page costs exactly one request. The filter and projection
/// never change between pages; only `page` advances. The walk ends after
/// the last page, after the first error, or when a terminal page comes back
/// empty (that page is not produced).
#[derive(Debug)]
pub struct UserSearch {
    service: AccountService,
    filter: FieldBag,
    selection: FieldSelection,
    pagination: FieldBag,
    cursor: Cursor,
}

impl UserSearch {
    pub(crate) const fn new(
        service: AccountService,
        filter: FieldBag,
        selection: FieldSelection,
        pagination: FieldBag,
    ) -> Self {
        Self {
            service,
            filter,
            selection,
            pagination,
            cursor: Cursor::Start,
        }
    }

    /// Returns true while another page may be produced.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor != Cursor::Done
    }

    /// Fetch the next page, or `None` once the walk has ended.
    pub async fn next_page(&mut self) -> AccountResult<Option<Page<User>>> {
        let pagination = match self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => self.pagination.clone(),
            Cursor::Page(page) => self.pagination.clone().with("page", page),
        };

        let page = match self
            .service
            .find_page(self.filter.clone(), &self.selection, pagination)
            .await
        {
            Ok(page) => page,
            Err(error) => {
                self.cursor = Cursor::Done;
                return Err(error);
            },
        };

        let next = page.page().saturating_add(1);
        if page.page() >= page.pages() || next > MAX_PAGE {
            self.cursor = Cursor::Done;
            if page.docs().is_empty() {
                return Ok(None);
            }
        } else {
            self.cursor = Cursor::Page(next);
        }
        Ok(Some(page))
    }

    /// Drain the walk into a flat list of users.
    pub async fn collect_users(mut self) -> AccountResult<Vec<User>> {
        let mut users = Vec::new();
        while let Some(page) = self.next_page().await? {
            users.extend(page.into_docs());
        }
        Ok(users)
    }

    /// Turn the walk into a stream of pages; the stream ends after an error.
    pub fn into_stream(self) -> impl Stream<Item = AccountResult<Page<User>>> + Send {
        stream::unfold(self, |mut search| async move {
            match search.next_page().await {
                Ok(Some(page)) => Some((Ok(page), search)),
                Ok(None) => None,
                Err(error) => Some((Err(error), search)),
            }
        })
    }
}
