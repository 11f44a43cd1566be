pub mod address;
pub mod contact;
pub mod user;

pub use address::{Address, AddressFields, AddressResponse, CreateAddressRequest, GetAddressRequest, UpdateAddressRequest};
pub use contact::{Contact, ContactFields, ContactResponse, SearchContactRequest, UpdateContactRequest};
pub use user::{LoginUserRequest, RegisterUserRequest, UpdateUserRequest, User, UserResponse};
