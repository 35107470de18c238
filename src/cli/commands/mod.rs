pub mod check;
pub mod extract;
pub mod helper;
pub mod inspect;
pub mod new_locale;
