// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ordered set of finished pages waiting to become one document.

use scanwerk_core::PageId;
use scanwerk_core::error::{Result, ScanError};
use tracing::{debug, info, instrument};

use crate::pdf::page::{DocumentBytes, Page};
use crate::pdf::writer::PdfWriter;

/// Pages in document order. Insertion order is kept until the caller
/// reorders.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and return its id.
    pub fn add(&mut self, page: Page) -> PageId {
        let id = page.id();
        self.pages.push(page);
        debug!(%id, count = self.pages.len(), "Page added");
        id
    }

    pub fn remove(&mut self, index: usize) -> Result<Page> {
        self.check_index(index)?;
        let page = self.pages.remove(index);
        debug!(index, count = self.pages.len(), "Page removed");
        Ok(page)
    }

    /// Move the page at `from` so that it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        debug!(from, to, "Page moved");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn position(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Encode every page, in current order, into one PDF.
    #[instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn encode(&self) -> Result<DocumentBytes> {
        let document = PdfWriter::new().write(&self.pages)?;
        info!(bytes = document.len(), "Document ready");
        Ok(document)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(ScanError::InvalidInput(format!(
                "page index {index} is out of range for {} pages",
                self.pages.len()
            )))
        }
    }
}

impl<'a> IntoIterator for &'a PageCollection {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

impl FromIterator<Page> for PageCollection {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
