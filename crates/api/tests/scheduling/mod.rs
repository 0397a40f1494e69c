mod reserve_test;
mod sweep_test;
