mod admin_test;
mod helpers;
mod profile_test;
