//! The identity binding table against a `HashMap` model

use std::collections::HashMap;

use conduit::backend::auth::{BindingError, IdentityBindingTable};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Bind(u8, u8),
    Unbind(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 0u8..4).prop_map(|(c, u)| Op::Bind(c, u)),
        (0u8..6).prop_map(Op::Unbind),
    ]
}

proptest! {
    #[test]
    fn test_table_matches_model(ops in prop::collection::vec(op(), 0..64)) {
        let table = IdentityBindingTable::new();
        let mut model: HashMap<String, String> = HashMap::new();

        for op in ops {
            match op {
                Op::Bind(c, u) => {
                    let (conn, user) = (format!("c{}", c), format!("user{}", u));
                    let result = table.bind(&conn, &user);
                    if model.contains_key(&conn) {
                        let is_already_bound = matches!(result, Err(BindingError::AlreadyBound { .. }));
                        prop_assert!(is_already_bound);
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(conn, user);
                    }
                }
                Op::Unbind(c) => {
                    let conn = format!("c{}", c);
                    let result = table.unbind(&conn);
                    if model.remove(&conn).is_some() {
                        prop_assert!(result.is_ok());
                    } else {
                        let is_not_bound = matches!(result, Err(BindingError::NotBound { .. }));
                        prop_assert!(is_not_bound);
                    }
                }
            }

            prop_assert_eq!(table.len(), model.len());
        }

        for c in 0u8..6 {
            let conn = format!("c{}", c);
            prop_assert_eq!(table.is_bound(&conn), model.contains_key(&conn));
            prop_assert_eq!(table.lookup(&conn).ok(), model.get(&conn).cloned());
        }
    }
}
