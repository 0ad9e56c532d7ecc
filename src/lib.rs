pub mod shared {
    pub mod core {
        pub mod narration;
    }
    pub mod infrastructure {
        pub mod kv_store;
    }
}

pub mod modules {
    pub mod calculator {
        pub mod core {
            pub mod operand;
            pub mod operation;
            pub mod record_key;
        }
        pub mod use_cases {
            pub mod record_operation {
                pub mod handler;
            }
            pub mod compute {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod list_history {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod purge_history {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;
