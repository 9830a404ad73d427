mod no_catch_return;

pub use no_catch_return::NoCatchReturn;
