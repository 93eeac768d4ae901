//! Named constructors for the query dialect's functions

use super::function::{Argument, Expression};
use crate::error::ConstructionError;

macro_rules! simple_functions {
    ($($name:ident => $identifier:literal),* $(,)?) => {
        $(
            #[doc = concat!("`", $identifier, "(field)`")]
            pub fn $name(field: impl Into<Argument>) -> Expression {
                Expression::function($identifier, field)
            }
        )*
    };
}

macro_rules! parameterized_functions {
    ($($name:ident => $identifier:literal),* $(,)?) => {
        $(
            #[doc = concat!("`", $identifier, "(field, ..., n)`")]
            pub fn $name<A: Into<Argument>>(
                n: impl Into<f64>,
                fields: impl IntoIterator<Item = A>,
            ) -> Result<Expression, ConstructionError> {
                Expression::parameterized($identifier, n, fields)
            }
        )*
    };
}

// Aggregations
simple_functions! {
    count => "COUNT",
    distinct => "DISTINCT",
    integral => "INTEGRAL",
    mean => "MEAN",
    median => "MEDIAN",
    mode => "MODE",
    spread => "SPREAD",
    stddev => "STDDEV",
    sum => "SUM",
}

// Selectors
simple_functions! {
    first => "FIRST",
    last => "LAST",
    max => "MAX",
    min => "MIN",
}

// Transformations
simple_functions! {
    abs => "ABS",
    acos => "ACOS",
    asin => "ASIN",
    atan => "ATAN",
    ceil => "CEIL",
    cos => "COS",
    cumulative_sum => "CUMULATIVE_SUM",
    derivative => "DERIVATIVE",
    difference => "DIFFERENCE",
    elapsed => "ELAPSED",
    exp => "EXP",
    floor => "FLOOR",
    ln => "LN",
    log2 => "LOG2",
    log10 => "LOG10",
    non_negative_derivative => "NON_NEGATIVE_DERIVATIVE",
    non_negative_difference => "NON_NEGATIVE_DIFFERENCE",
    round => "ROUND",
    sin => "SIN",
    sqrt => "SQRT",
    tan => "TAN",
}

parameterized_functions! {
    bottom => "BOTTOM",
    top => "TOP",
    percentile => "PERCENTILE",
    sample => "SAMPLE",
    moving_average => "MOVING_AVERAGE",
}

// Technical analysis
parameterized_functions! {
    chande_momentum_oscillator => "CHANDE_MOMENTUM_OSCILLATOR",
    exponential_moving_average => "EXPONENTIAL_MOVING_AVERAGE",
    double_exponential_moving_average => "DOUBLE_EXPONENTIAL_MOVING_AVERAGE",
    kaufmans_efficiency_ratio => "KAUFMANS_EFFICIENCY_RATIO",
    kaufmans_adaptive_moving_average => "KAUFMANS_ADAPTIVE_MOVING_AVERAGE",
    triple_exponential_moving_average => "TRIPLE_EXPONENTIAL_MOVING_AVERAGE",
    relative_strength_index => "RELATIVE_STRENGTH_INDEX",
}
