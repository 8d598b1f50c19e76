//! Data models for the procurement backend.
//!
//! - `reference`: the lookup snapshot behind every selection control
//! - `budget`, `purchase_order`, `contract`: the financial entities and their
//!   transition requests
//! - `project`, `task`, `supplier`, `contact`, `service`: catalogue entities
//! - `user`, `dashboard`, `notification`: session and console-level records
//!
//! Payloads are loosely typed server side, so numeric and id fields go
//! through the lenient deserializers in `common`.

pub mod budget;
pub mod common;
pub mod contact;
pub mod contract;
pub mod dashboard;
pub mod notification;
pub mod project;
pub mod purchase_order;
pub mod reference;
pub mod service;
pub mod supplier;
pub mod task;
pub mod user;

pub use budget::{Budget, BudgetInput, BudgetLine, BudgetLineInput, BudgetOverview, VoteRequest};
pub use common::{ListResponse, MutationOutcome, StatBucket};
pub use contact::{Contact, ContactFilter, ContactInput};
pub use contract::{Contract, ContractInput, RenewalRequest};
pub use dashboard::{ContractAlert, Dashboard};
pub use notification::{Notification, NotificationFeed};
pub use project::{Project, ProjectInput, ProjectWorkload, WorkloadReport};
pub use purchase_order::{
    compute_ttc, derive_vat_rate, AllocationRequest, LineOrders, PoAction, PoStatus,
    PurchaseOrder, PurchaseOrderFilter, PurchaseOrderInput, PurchaseOrderStats,
};
pub use reference::{
    ApplicationRef, BudgetLineRef, Category, ContractRef, EntityRef, ProjectRef, RefOption,
    ReferenceSnapshot, ServiceRef, SupplierRef,
};
pub use service::{OrgService, OrgServiceInput};
pub use supplier::{Supplier, SupplierInput};
pub use task::{KanbanBoard, KanbanColumn, Task, TaskFilter, TaskInput};
pub use user::{AdminUser, LoginRequest, LoginResponse, ToggleRequest, UserDescriptor, UserInput};
