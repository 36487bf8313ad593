//! A bookkeeping session: the in-memory book plus the store it mirrors.

use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
};

use shopbook_core::{
    load_book, storage::book_warnings, Balances, CoreError, DebtorSummary, InventoryService,
    InvestorService, InvestorSummary, LedgerService, MemoryStore, NewInvestorEntry, NewItem,
    NewPurchase, NewSale, PaymentRequest, ProfitReport, PurchaseService, RecordStore,
    ReportService, SalesService, SettlementOutcome, SettlementService, SummaryService,
};
use shopbook_domain::{
    Book, DebtorKind, InventoryItem, InvestorEntry, Movement, Purchase, Sale,
};
use shopbook_storage_json::{JsonRecordStore, StorePaths};

use crate::errors::AppError;

/// Owns the book for one process and serializes every mutation.
///
/// The FIFO walk and the store writes that follow it run under one lock, so two
/// settlements against the same debtor can never allocate the same balance twice.
pub struct Bookkeeper {
    book: Mutex<Book>,
    store: Box<dyn RecordStore>,
}

impl Bookkeeper {
    /// Loads the full book from `store`.
    pub fn open(store: Box<dyn RecordStore>) -> Result<Self, AppError> {
        let book = load_book(store.as_ref())?;
        tracing::debug!(rows = book.row_count(), "loaded book");
        Ok(Self {
            book: Mutex::new(book),
            store,
        })
    }

    /// Opens the JSON book stored under `root`.
    pub fn open_json(root: &Path, backup_retention: usize) -> Result<Self, AppError> {
        let store = JsonRecordStore::with_retention(StorePaths::under(root), backup_retention)?;
        Self::open(Box::new(store))
    }

    /// An empty session backed by a process-local store.
    pub fn in_memory() -> Self {
        Self {
            book: Mutex::new(Book::new()),
            store: Box::new(MemoryStore::new()),
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Drops in-memory state and reads everything from the store again.
    pub fn reload(&self) -> Result<(), AppError> {
        let fresh = load_book(self.store.as_ref())?;
        *self.lock()? = fresh;
        Ok(())
    }

    pub fn snapshot(&self) -> Result<Book, AppError> {
        Ok(self.lock()?.clone())
    }

    pub fn settle_customer(&self, request: &PaymentRequest) -> Result<SettlementOutcome, AppError> {
        let mut book = self.lock()?;
        Ok(SettlementService::settle_customer(
            &mut book,
            self.store.as_ref(),
            request,
        )?)
    }

    pub fn settle_supplier(&self, request: &PaymentRequest) -> Result<SettlementOutcome, AppError> {
        let mut book = self.lock()?;
        Ok(SettlementService::settle_supplier(
            &mut book,
            self.store.as_ref(),
            request,
        )?)
    }

    pub fn record_sale(&self, input: NewSale) -> Result<Sale, AppError> {
        let mut book = self.lock()?;
        Ok(SalesService::record_sale(&mut book, self.store.as_ref(), input)?)
    }

    pub fn record_purchase(&self, input: NewPurchase) -> Result<Purchase, AppError> {
        let mut book = self.lock()?;
        Ok(PurchaseService::record_purchase(
            &mut book,
            self.store.as_ref(),
            input,
        )?)
    }

    pub fn add_item(&self, input: NewItem) -> Result<InventoryItem, AppError> {
        let mut book = self.lock()?;
        Ok(InventoryService::add_item(&mut book, self.store.as_ref(), input)?)
    }

    pub fn record_investor_entry(&self, input: NewInvestorEntry) -> Result<InvestorEntry, AppError> {
        let mut book = self.lock()?;
        Ok(InvestorService::record_entry(
            &mut book,
            self.store.as_ref(),
            input,
        )?)
    }

    /// Ledger movements within the optional inclusive date range.
    pub fn ledger(&self, from: Option<&str>, to: Option<&str>) -> Result<Vec<Movement>, AppError> {
        let movements = LedgerService::book_ledger(&*self.lock()?);
        Ok(LedgerService::filter_movements(&movements, from, to))
    }

    pub fn balances(&self) -> Result<Balances, AppError> {
        let movements = LedgerService::book_ledger(&*self.lock()?);
        Ok(LedgerService::balances(&movements))
    }

    pub fn debtors(&self, kind: DebtorKind) -> Result<Vec<DebtorSummary>, AppError> {
        let book = self.lock()?;
        Ok(SummaryService::debtor_summaries(book.credits(kind), kind))
    }

    pub fn open_balance(&self, kind: DebtorKind, name: &str) -> Result<f64, AppError> {
        let book = self.lock()?;
        Ok(shopbook_core::open_balance(book.credits(kind), name))
    }

    pub fn items(&self) -> Result<Vec<InventoryItem>, AppError> {
        let book = self.lock()?;
        Ok(InventoryService::list(&book).into_iter().cloned().collect())
    }

    pub fn profit_report(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        investor_share: f64,
    ) -> Result<ProfitReport, AppError> {
        let book = self.lock()?;
        Ok(ReportService::profit_report(&book, from, to, investor_share))
    }

    pub fn investor_summary(&self) -> Result<InvestorSummary, AppError> {
        Ok(InvestorService::summary(&*self.lock()?))
    }

    /// Dangling references and inconsistent balances in the current book.
    pub fn warnings(&self) -> Result<Vec<String>, AppError> {
        Ok(book_warnings(&*self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Book>, CoreError> {
        self.book
            .lock()
            .map_err(|_| CoreError::LockPoisoned("book"))
    }
}
