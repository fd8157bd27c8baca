pub mod hazard_rss;
