//! In-memory repository backend

mod memory;

pub use memory::{
    InMemoryBookingRepository, InMemoryPaymentRepository, InMemoryRepositoryProvider,
    InMemoryRequesterRepository, InMemoryShowRepository,
};
