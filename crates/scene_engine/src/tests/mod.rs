//! Cross-module tests that drive whole scenes through the built-in and
//! custom actions

mod custom_action;
