//! In-memory port implementations and a wired AppState for tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use foodcourt_core::domain::{
    Booth, BoothUpdate, Menu, MenuFilter, MenuUpdate, NewBooth, NewMenu, NewNotificationRecord,
    NewOrder, NotificationRecord, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
use foodcourt_core::health::{DependencyChecker, MessagingChecker};
use foodcourt_core::messaging::MessagingError;
use foodcourt_core::payment::{Invoice, InvoiceRequest, PaymentError};
use foodcourt_core::ports::{
    CatalogGateway, CatalogRepository, MessagingSender, NotificationLogStore, OrderStore,
    PaymentGateway, RepositoryError, RepositoryResult,
};
use foodcourt_core::utils::pagination::PageRequest;
use foodcourt_core::{AppSettings, AppState, Collaborators};

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const CALLBACK_TOKEN: &str = "test-callback-token";

// ---------------------------------------------------------------------------
// Order store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    next_id: AtomicI64,
    pub status_writes: AtomicUsize,
    pub atomic_writes: AtomicUsize,
    /// Status another writer lands between the service's read and the next
    /// atomic write.
    pub interleaved_status: Mutex<Option<OrderStatus>>,
}

impl InMemoryOrderStore {
    pub fn get(&self, code: &str) -> Option<Order> {
        let orders = self.orders.lock().unwrap();
        orders.iter().find(|o| o.order_code == code).cloned()
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Inserts a ready-made order, bypassing checkout.
    pub fn insert(&self, mut order: Order) -> Order {
        order.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.orders.lock().unwrap().push(order.clone());
        order
    }

    pub fn total_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst) + self.atomic_writes.load(Ordering::SeqCst)
    }

    fn with_order<F>(&self, code: &str, f: F) -> RepositoryResult<()>
    where
        F: FnOnce(&mut Order),
    {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order_code == code)
            .ok_or_else(|| RepositoryError::NotFound(code.to_string()))?;
        f(order);
        order.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, new: &NewOrder) -> RepositoryResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_code == new.order_code) {
            return Err(RepositoryError::Conflict(new.order_code.clone()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let items = new
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| OrderItem {
                id: id * 100 + idx as i64,
                menu_id: item.menu_id,
                booth_id: item.booth_id,
                quantity: item.quantity,
                price_at_purchase: item.price_at_purchase,
                notes: item.notes.clone(),
                menu_name: item.menu_name.clone(),
                booth_name: item.booth_name.clone(),
                booth_contact: item.booth_contact.clone(),
            })
            .collect();

        let order = Order {
            id,
            order_code: new.order_code.clone(),
            customer_name: new.customer_name.clone(),
            table_number: new.table_number.clone(),
            total_amount: new.total_amount(),
            payment_method: new.payment_method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            invoice_id: None,
            invoice_url: None,
            created_at: now,
            updated_at: now,
            items,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn find_order_by_code(&self, code: &str) -> RepositoryResult<Order> {
        self.get(code)
            .ok_or_else(|| RepositoryError::NotFound(code.to_string()))
    }

    async fn update_invoice_fields(
        &self,
        code: &str,
        invoice_id: &str,
        invoice_url: &str,
    ) -> RepositoryResult<()> {
        self.with_order(code, |o| {
            o.invoice_id = Some(invoice_id.to_string());
            o.invoice_url = Some(invoice_url.to_string());
        })
    }

    async fn update_payment_status(&self, code: &str, status: PaymentStatus) -> RepositoryResult<()> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        self.with_order(code, |o| o.payment_status = status)
    }

    async fn update_order_status(&self, code: &str, status: OrderStatus) -> RepositoryResult<()> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        self.with_order(code, |o| o.order_status = status)
    }

    async fn apply_payment_result(
        &self,
        code: &str,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
    ) -> RepositoryResult<bool> {
        self.atomic_writes.fetch_add(1, Ordering::SeqCst);
        let interleaved = self.interleaved_status.lock().unwrap().take();
        let mut written = false;
        self.with_order(code, |o| {
            if let Some(status) = interleaved {
                o.order_status = status;
            }
            if !o.order_status.is_final() {
                o.payment_status = payment_status;
                o.order_status = order_status;
                written = true;
            }
        })?;
        Ok(written)
    }

    async fn list_orders(
        &self,
        page: PageRequest,
        status: Option<OrderStatus>,
    ) -> RepositoryResult<(Vec<Order>, i64)> {
        let mut matching: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| status.map_or(true, |s| o.order_status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn total_income_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| o.created_at >= since && o.payment_status == PaymentStatus::Paid)
            .map(|o| o.total_amount)
            .sum())
    }

    async fn count_orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<i64> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().filter(|o| o.created_at >= since).count() as i64)
    }

    async fn orders_since(&self, since: DateTime<Utc>) -> RepositoryResult<Vec<Order>> {
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().filter(|o| o.created_at >= since).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCatalog {
    booths: Mutex<Vec<Booth>>,
    menus: Mutex<Vec<Menu>>,
    next_id: AtomicI64,
}

impl InMemoryCatalog {
    pub fn add_booth(&self, name: &str, contact: &str, is_active: bool) -> Booth {
        let now = Utc::now();
        let booth = Booth {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            contact: contact.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        };
        self.booths.lock().unwrap().push(booth.clone());
        booth
    }

    pub fn add_menu(&self, id: i64, booth: &Booth, name: &str, price: i64, is_available: bool) -> Menu {
        let menu = Menu {
            id,
            booth_id: booth.id,
            name: name.to_string(),
            price,
            is_available,
            category: "makanan".to_string(),
            description: String::new(),
            image_path: None,
            booth: booth.clone(),
        };
        self.menus.lock().unwrap().push(menu.clone());
        menu
    }

    pub fn set_menu_price(&self, id: i64, price: i64) {
        let mut menus = self.menus.lock().unwrap();
        if let Some(menu) = menus.iter_mut().find(|m| m.id == id) {
            menu.price = price;
        }
    }

    fn booth(&self, id: i64) -> Option<Booth> {
        self.booths.lock().unwrap().iter().find(|b| b.id == id).cloned()
    }

    fn resolve(&self, mut menu: Menu) -> Menu {
        if let Some(booth) = self.booth(menu.booth_id) {
            menu.booth = booth;
        }
        menu
    }
}

#[async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn find_menu_by_id(&self, id: i64) -> RepositoryResult<Menu> {
        let menu = self
            .menus
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("menu {}", id)))?;
        Ok(self.resolve(menu))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_menus(&self, filter: &MenuFilter) -> RepositoryResult<Vec<Menu>> {
        let menus: Vec<Menu> = self.menus.lock().unwrap().clone();
        Ok(menus
            .into_iter()
            .map(|m| self.resolve(m))
            .filter(|m| filter.include_unavailable || m.is_orderable())
            .filter(|m| filter.booth_id.map_or(true, |id| m.booth_id == id))
            .filter(|m| filter.category.as_ref().map_or(true, |c| &m.category == c))
            .filter(|m| {
                filter.search.as_ref().map_or(true, |s| {
                    m.name.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .collect())
    }

    async fn list_booths(&self, active_only: bool) -> RepositoryResult<Vec<Booth>> {
        Ok(self
            .booths
            .lock()
            .unwrap()
            .iter()
            .filter(|b| !active_only || b.is_active)
            .cloned()
            .collect())
    }

    async fn find_booth_by_id(&self, id: i64) -> RepositoryResult<Booth> {
        self.booth(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("booth {}", id)))
    }

    async fn find_booth_by_name(&self, name: &str) -> RepositoryResult<Option<Booth>> {
        Ok(self
            .booths
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create_booth(&self, booth: &NewBooth) -> RepositoryResult<Booth> {
        Ok(self.add_booth(&booth.name, &booth.contact, booth.is_active))
    }

    async fn update_booth(&self, id: i64, update: &BoothUpdate) -> RepositoryResult<Booth> {
        let mut booths = self.booths.lock().unwrap();
        let booth = booths
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("booth {}", id)))?;
        if let Some(name) = &update.name {
            booth.name = name.clone();
        }
        if let Some(contact) = &update.contact {
            booth.contact = contact.clone();
        }
        if let Some(active) = update.is_active {
            booth.is_active = active;
        }
        Ok(booth.clone())
    }

    async fn delete_booth(&self, id: i64) -> RepositoryResult<()> {
        if self.menus.lock().unwrap().iter().any(|m| m.booth_id == id) {
            return Err(RepositoryError::Conflict(format!("booth {} has menus", id)));
        }
        let mut booths = self.booths.lock().unwrap();
        let before = booths.len();
        booths.retain(|b| b.id != id);
        if booths.len() == before {
            return Err(RepositoryError::NotFound(format!("booth {}", id)));
        }
        Ok(())
    }

    async fn create_menu(&self, menu: &NewMenu) -> RepositoryResult<Menu> {
        let booth = self.find_booth_by_id(menu.booth_id).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1000;
        let mut created = self.add_menu(id, &booth, &menu.name, menu.price, menu.is_available);
        created.category = menu.category.clone();
        created.description = menu.description.clone();
        let mut menus = self.menus.lock().unwrap();
        if let Some(stored) = menus.iter_mut().find(|m| m.id == id) {
            *stored = created.clone();
        }
        Ok(created)
    }

    async fn update_menu(&self, id: i64, update: &MenuUpdate) -> RepositoryResult<Menu> {
        {
            let mut menus = self.menus.lock().unwrap();
            let menu = menus
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| RepositoryError::NotFound(format!("menu {}", id)))?;
            if let Some(booth_id) = update.booth_id {
                menu.booth_id = booth_id;
            }
            if let Some(name) = &update.name {
                menu.name = name.clone();
            }
            if let Some(price) = update.price {
                menu.price = price;
            }
            if let Some(available) = update.is_available {
                menu.is_available = available;
            }
            if let Some(category) = &update.category {
                menu.category = category.clone();
            }
        }
        self.find_menu_by_id(id).await
    }

    async fn delete_menu(&self, id: i64) -> RepositoryResult<()> {
        let mut menus = self.menus.lock().unwrap();
        let before = menus.len();
        menus.retain(|m| m.id != id);
        if menus.len() == before {
            return Err(RepositoryError::NotFound(format!("menu {}", id)));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notification log
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryLogStore {
    records: Mutex<Vec<NotificationRecord>>,
    pub fail_writes: AtomicBool,
}

impl InMemoryLogStore {
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationLogStore for InMemoryLogStore {
    async fn append(&self, record: &NewNotificationRecord) -> RepositoryResult<NotificationRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database("log table unavailable".to_string()));
        }

        let mut records = self.records.lock().unwrap();
        let stored = NotificationRecord {
            id: records.len() as i64 + 1,
            order_id: record.order_id,
            booth_id: record.booth_id,
            message_type: record.message_type.clone(),
            status: record.status.clone(),
            response: record.response.clone(),
            sent_at: Utc::now() + Duration::milliseconds(records.len() as i64),
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<(Vec<NotificationRecord>, i64)> {
        let mut records = self.records();
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));
        let total = records.len() as i64;
        let items = records
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }
}

// ---------------------------------------------------------------------------
// Payment gateway
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePaymentGateway {
    requests: Mutex<Vec<InvoiceRequest>>,
    pub fail: AtomicBool,
}

impl FakePaymentGateway {
    pub fn requests(&self) -> Vec<InvoiceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, PaymentError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Rejected {
                status: 503,
                body: "gateway down".to_string(),
            });
        }
        Ok(Invoice {
            id: format!("inv-{}", request.external_id),
            invoice_url: format!("https://checkout.test/{}", request.external_id),
        })
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

pub struct FakeMessenger {
    pub connected: AtomicBool,
    failing: Mutex<HashSet<String>>,
    sent: Mutex<Vec<(String, String)>>,
    pub delay: Mutex<Option<std::time::Duration>>,
}

impl Default for FakeMessenger {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(true),
            failing: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }
}

impl FakeMessenger {
    pub fn fail_for(&self, destination: &str) {
        self.failing.lock().unwrap().insert(destination.to_string());
    }

    /// Every send attempt, successful or not, as (destination, text).
    pub fn calls(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingSender for FakeMessenger {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send_message(&self, destination: &str, text: &str) -> Result<(), MessagingError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));

        if !self.is_connected() {
            return Err(MessagingError::NotConnected);
        }

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(destination) {
            return Err(MessagingError::SendFailed {
                attempts: 3,
                reason: "gateway responded 500".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct TestContext {
    pub orders: Arc<InMemoryOrderStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub logs: Arc<InMemoryLogStore>,
    pub payments: Arc<FakePaymentGateway>,
    pub messaging: Arc<FakeMessenger>,
    pub state: AppState,
}

pub fn test_context() -> TestContext {
    test_context_with_callback_token(Some(CALLBACK_TOKEN))
}

pub fn test_context_with_callback_token(callback_token: Option<&str>) -> TestContext {
    let orders = Arc::new(InMemoryOrderStore::default());
    let catalog = Arc::new(InMemoryCatalog::default());
    let logs = Arc::new(InMemoryLogStore::default());
    let payments = Arc::new(FakePaymentGateway::default());
    let messaging = Arc::new(FakeMessenger::default());

    let deps = Collaborators {
        orders: orders.clone(),
        menus: catalog.clone(),
        catalog: catalog.clone(),
        notification_logs: logs.clone(),
        payments: payments.clone(),
        messaging: messaging.clone(),
    };
    let settings = AppSettings {
        base_url: "https://foodcourt.test".to_string(),
        admin_api_token: Some(ADMIN_TOKEN.to_string()),
        callback_token: callback_token.map(str::to_string),
        business_offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        log_request_body: false,
    };
    let checkers: Vec<Arc<dyn DependencyChecker>> =
        vec![Arc::new(MessagingChecker::new(messaging.clone()))];

    let state = AppState::new(deps, settings, checkers);

    TestContext {
        orders,
        catalog,
        logs,
        payments,
        messaging,
        state,
    }
}

/// Two active booths with menu 1 (25000) and menu 5 (15000).
pub fn seed_two_booths(ctx: &TestContext) -> (Booth, Booth) {
    let nasi = ctx.catalog.add_booth("Warung Nusantara", "0812-1111-0001", true);
    let es = ctx.catalog.add_booth("Es Segar", "0812-2222-0002", true);
    ctx.catalog.add_menu(1, &nasi, "Nasi Goreng", 25000, true);
    ctx.catalog.add_menu(5, &es, "Es Jeruk", 15000, true);
    (nasi, es)
}

pub fn pending_order(code: &str, method: PaymentMethod) -> Order {
    let now = Utc::now();
    Order {
        id: 0,
        order_code: code.to_string(),
        customer_name: "Budi".to_string(),
        table_number: "A1".to_string(),
        total_amount: 25000,
        payment_method: method,
        payment_status: PaymentStatus::Pending,
        order_status: OrderStatus::Pending,
        invoice_id: None,
        invoice_url: None,
        created_at: now,
        updated_at: now,
        items: Vec::new(),
    }
}
