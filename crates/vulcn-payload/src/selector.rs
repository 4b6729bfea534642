//! Field-name to selector resolution (spec.md §4.1): a logical form field
//! name resolves to an ordered list of CSS candidates tried in priority
//! order by the Driver (`vulcn_driver::url_injection::split_ordered_selector`).

pub use vulcn_driver::url_injection::ordered_field_selector as resolve_field_selector;
