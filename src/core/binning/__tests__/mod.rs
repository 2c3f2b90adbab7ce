pub mod segments_test;
