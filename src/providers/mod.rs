pub mod coindesk;

pub use coindesk::CoindeskProvider;
