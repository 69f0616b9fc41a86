use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitFloat, LitInt, Token, parse_macro_input};

/// Full-scale value of the curve-design coordinate system.
const DESIGN_RANGE: f64 = 4095.0;

/// Creates a `CubicBezier` at compile time from two control-point literals.
///
/// The control points are given in curve-design units (`0..=4095`), after the
/// orientation of the curve. The anchors are implied by the orientation:
/// `rising` curves run from `(0, 0)` to `(4095, 4095)`, `falling` curves from
/// `(0, 4095)` to `(4095, 0)`.
///
/// The macro rejects control points whose x coordinate would not be monotonic
/// in the curve parameter, since bisection cannot invert such a curve. The
/// expansion is a const-evaluable expression.
///
/// # Examples
///
/// ```ignore
/// use contour::bezier;
///
/// let soft = bezier!(falling: (250, 1500), (1500, 250));
/// let steep = bezier!(rising: (330, 4220), (430, 3710));
///
/// // Negative and fractional coordinates are accepted
/// let dip = bezier!(falling: (160, 360), (-80.5, 470));
/// ```
#[proc_macro]
pub fn bezier(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as BezierInput);

    if let Err(e) = check_monotonic(input.p1.0, input.p2.0) {
        let error_msg = format!("invalid Bézier control points: {}", e);
        let expanded = quote! {
            compile_error!(#error_msg)
        };
        return TokenStream::from(expanded);
    }

    let (x1, y1) = (input.p1.0 as f32, input.p1.1 as f32);
    let (x2, y2) = (input.p2.0 as f32, input.p2.1 as f32);
    let constructor = match input.orientation {
        Orientation::Rising => quote! { rising },
        Orientation::Falling => quote! { falling },
    };

    let expanded = quote! {
        ::contour::CubicBezier::#constructor(
            ::contour::ControlPoint::new(#x1, #y1),
            ::contour::ControlPoint::new(#x2, #y2),
        )
    };

    TokenStream::from(expanded)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Rising,
    Falling,
}

struct BezierInput {
    orientation: Orientation,
    p1: (f64, f64),
    p2: (f64, f64),
}

impl Parse for BezierInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        let orientation = parse_orientation(&ident.to_string())
            .map_err(|e| syn::Error::new(ident.span(), e))?;
        input.parse::<Token![:]>()?;

        let p1 = parse_point(input)?;
        input.parse::<Token![,]>()?;
        let p2 = parse_point(input)?;

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }

        Ok(Self {
            orientation,
            p1,
            p2,
        })
    }
}

fn parse_orientation(s: &str) -> Result<Orientation, String> {
    match s {
        "rising" => Ok(Orientation::Rising),
        "falling" => Ok(Orientation::Falling),
        _ => Err(format!("expected `rising` or `falling`, found `{}`", s)),
    }
}

fn parse_point(input: ParseStream) -> syn::Result<(f64, f64)> {
    let content;
    syn::parenthesized!(content in input);

    let x = parse_number(&content)?;
    content.parse::<Token![,]>()?;
    let y = parse_number(&content)?;

    if !content.is_empty() {
        return Err(content.error("expected a point of the form `(x, y)`"));
    }
    Ok((x, y))
}

fn parse_number(input: ParseStream) -> syn::Result<f64> {
    let negative = if input.peek(Token![-]) {
        input.parse::<Token![-]>()?;
        true
    } else {
        false
    };

    let lookahead = input.lookahead1();
    let value = if lookahead.peek(LitInt) {
        input.parse::<LitInt>()?.base10_parse::<f64>()?
    } else if lookahead.peek(LitFloat) {
        input.parse::<LitFloat>()?.base10_parse::<f64>()?
    } else {
        return Err(lookahead.error());
    };

    Ok(if negative { -value } else { value })
}

/// The x derivative of a cubic with x anchors at 0 and full scale is a
/// quadratic Bernstein polynomial with coefficients `x1`, `x2 - x1` and
/// `full - x2`; it stays non-negative on [0, 1] exactly when both outer
/// coefficients are non-negative and the middle one is not below
/// `-sqrt(outer product)`.
fn check_monotonic(x1: f64, x2: f64) -> Result<(), String> {
    let a = x1;
    let b = x2 - x1;
    let c = DESIGN_RANGE - x2;

    if a < 0.0 {
        return Err(format!("first control point x {} is below 0", x1));
    }
    if c < 0.0 {
        return Err(format!(
            "second control point x {} is above {}",
            x2, DESIGN_RANGE
        ));
    }
    if b < 0.0 && b * b > a * c {
        return Err(format!(
            "x is not monotonic for control point x values {} and {}",
            x1, x2
        ));
    }
    Ok(())
}
