// Resource modules layered on the eAPI command primitives.
//
// Each module owns one class of configuration resource: it parses the
// device's show-command text into typed records and translates mutation
// requests into ordered config-mode command sequences.

pub mod acl;

pub use acl::StandardAcls;
