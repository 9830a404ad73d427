mod homeless_try;

pub use homeless_try::HomelessTry;
