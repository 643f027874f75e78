//! Data models
//!
//! Entity structs stored in SurrealDB plus the Create/Update DTOs accepted
//! by the API. Record links are `RecordId` bridged through `serde_helpers`.

pub mod serde_helpers;

pub mod account;
pub mod attendance;
pub mod customer;
pub mod department;
pub mod employee;
pub mod invoice;
pub mod lead;
pub mod leave_request;
pub mod line_item;
pub mod opportunity;
pub mod payroll;
pub mod product;
pub mod quotation;
pub mod sales_order;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountCreate, AccountType, AccountUpdate};
pub use attendance::{
    Attendance, AttendanceCreate, AttendanceStatus, AttendanceUpdate, CheckDirection, CheckRequest,
};
pub use customer::{Customer, CustomerCreate, CustomerStatus, CustomerType, CustomerUpdate};
pub use department::{Department, DepartmentCreate, DepartmentUpdate};
pub use employee::{Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate};
pub use invoice::{
    Invoice, InvoiceCreate, InvoiceStatus, InvoiceUpdate, Payment, PaymentMethod, PaymentRequest,
};
pub use lead::{Lead, LeadCreate, LeadSource, LeadStatus, LeadUpdate};
pub use leave_request::{
    LeaveRequest, LeaveRequestCreate, LeaveStatus, LeaveStatusUpdate, LeaveType,
};
pub use line_item::LineItem;
pub use opportunity::{
    Activity, ActivityCreate, Opportunity, OpportunityCreate, OpportunityItem, OpportunityStage,
    OpportunityUpdate,
};
pub use payroll::{Payroll, PayrollCreate, PayrollStatus, PayrollUpdate};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use quotation::{Quotation, QuotationCreate, QuotationStatus, QuotationUpdate};
pub use sales_order::{SalesOrder, SalesOrderCreate, SalesOrderStatus, SalesOrderUpdate};
pub use transaction::{Transaction, TransactionCreate, TransactionType};
pub use user::{
    NotificationPreferences, SigninRequest, SignupRequest, User, UserPublic, UserUpdate,
};
