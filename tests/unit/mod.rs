/// Unit test target: pure streak policy properties
mod policy_tests;
