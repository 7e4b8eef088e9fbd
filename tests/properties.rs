//! Definitional properties of connections and the adjacency lookup.

use physarum_core::{Connection, FeedbackLaw, Network, Node, NodeId};
use proptest::prelude::*;

fn law() -> impl Strategy<Value = FeedbackLaw> {
    prop_oneof![
        Just(FeedbackLaw::TypeOne),
        Just(FeedbackLaw::TypeTwo),
        Just(FeedbackLaw::TypeThree),
    ]
}

proptest! {
    #[test]
    fn dl_fraction_is_conductivity_over_length(
        length in 0.01f64..100.0,
        conductivity in 0.0f64..10.0,
        p_start in -10.0f64..10.0,
        p_end in -10.0f64..10.0,
        mue in 0.5f64..2.0,
        law in law(),
    ) {
        let mut con = Connection::new(NodeId(0), NodeId(1), length, conductivity).with_law(law);
        prop_assert_eq!(con.dl_fraction(), con.conductivity() / con.length());

        con.update_flux_and_conductivity(p_start, p_end, mue);
        prop_assert_eq!(con.dl_fraction(), con.conductivity() / con.length());
        prop_assert_eq!(con.former_conductivity(), conductivity);
    }

    #[test]
    fn zero_flux_gives_zero_growth(
        mue in 0.1f64..3.0,
        saturation in 0.0f64..100.0,
        law in law(),
    ) {
        prop_assert_eq!(law.growth(0.0, mue, saturation), 0.0);
    }

    #[test]
    fn equal_pressures_only_decay(
        conductivity in 0.0f64..10.0,
        pressure in -10.0f64..10.0,
        law in law(),
    ) {
        let mut con = Connection::new(NodeId(0), NodeId(1), 1.0, conductivity).with_law(law);
        con.update_flux_and_conductivity(pressure, pressure, 1.2);
        prop_assert_eq!(con.flux(), 0.0);
        prop_assert!(con.conductivity() <= conductivity);
    }

    #[test]
    fn lookup_is_symmetric(
        lengths in prop::collection::vec(0.1f64..10.0, 3),
        conductivities in prop::collection::vec(0.1f64..1.0, 3),
    ) {
        let nodes = vec![Node::source(0), Node::sink(1), Node::new(2), Node::new(3)];
        let pairs = [(0, 2), (2, 3), (3, 1)];
        let connections = pairs
            .iter()
            .zip(lengths.iter().zip(&conductivities))
            .map(|(&(a, b), (&l, &d))| Connection::new(NodeId(a), NodeId(b), l, d))
            .collect();
        let network = Network::new(nodes, connections).unwrap();

        for a in 0..4 {
            for b in 0..4 {
                prop_assert_eq!(network.dl_fraction(a, b), network.dl_fraction(b, a));
            }
            prop_assert_eq!(network.dl_fraction(a, a), 0.0);
        }
    }
}
